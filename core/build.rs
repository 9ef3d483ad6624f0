use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const ICON_SIZE: u32 = 32;

/// Generated constant suffix and source file under `icons/`.
const ICONS: [(&str, &str); 4] = [
    ("FLASH", "flash.svg"),
    ("SDCARD", "sdcard.svg"),
    ("RELOAD", "reload.svg"),
    ("GEAR", "gear.svg"),
];

fn main() {
    let icon_dir = Path::new("icons");
    let out_path = PathBuf::from(std::env::var("OUT_DIR").unwrap()).join("icons.rs");

    let mut generated = String::new();
    writeln!(generated, "pub const ICON_SIZE: u32 = {};", ICON_SIZE).unwrap();

    for (name, file) in ICONS {
        let path = icon_dir.join(file);
        println!("cargo:rerun-if-changed={}", path.display());
        let mask = rasterize_mask(&path, ICON_SIZE);
        emit_mask(&mut generated, name, &mask);
    }

    fs::write(&out_path, generated).unwrap();
}

fn emit_mask(generated: &mut String, name: &str, mask: &[u8]) {
    writeln!(generated, "\npub const ICON_{}_MASK: &[u8] = &[", name).unwrap();
    for row in mask.chunks(ICON_SIZE as usize / 8) {
        let bytes: Vec<String> = row.iter().map(|b| format!("0x{:02X}", b)).collect();
        writeln!(generated, "    {},", bytes.join(", ")).unwrap();
    }
    generated.push_str("];\n");
}

/// Rasterises an SVG scaled to `size` square into a row-major 1-bit mask,
/// MSB first.
fn rasterize_mask(path: &Path, size: u32) -> Vec<u8> {
    let svg = fs::read(path).unwrap();
    let tree = usvg::Tree::from_data(&svg, &usvg::Options::default(), &usvg::fontdb::Database::new()).unwrap();

    let view = tree.size();
    let fit = tiny_skia::Transform::from_scale(size as f32 / view.width(), size as f32 / view.height());
    let mut pixmap = tiny_skia::Pixmap::new(size, size).unwrap();
    resvg::render(&tree, fit, &mut pixmap.as_mut());

    let mut mask = vec![0u8; (size * size) as usize / 8];
    for (idx, px) in pixmap.pixels().iter().enumerate() {
        // Anti-aliased edges below half coverage stay background.
        if px.alpha() >= 0x80 {
            mask[idx / 8] |= 0x80 >> (idx % 8);
        }
    }
    mask
}
