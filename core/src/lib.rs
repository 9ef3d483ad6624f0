#![cfg_attr(not(test), no_std)]

pub mod animation;
pub mod application;
pub mod audio;
pub mod catalog;
pub mod clock;
pub mod clock_sync;
pub mod config;
pub mod display;
pub mod framebuffer;
pub mod fs;
pub mod handoff;
pub mod icons;
pub mod input;
pub mod platform;
pub mod render;
pub mod selection;
