// File: src/color_utils.rs
// Pastel subject colors for the daily schedule

/// 64-bit FNV-1a, fixed across runs and toolchains.
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Deterministic pastel color for a subject name, as 8-bit RGB.
/// The same subject gets the same color on every day and in every class.
pub fn subject_color(subject: &str) -> (u8, u8, u8) {
    let hash = fnv1a(subject.trim());
    let hue = (hash % 360) as f32;
    // S: 40-90%, L: 65-90% so text stays readable on dark terminals.
    let sat = 0.40 + ((hash >> 20) % 51) as f32 / 100.0;
    let light = 0.65 + ((hash >> 40) % 26) as f32 / 100.0;
    hsl_to_rgb8(hue, sat, light)
}

fn hsl_to_rgb8(hue: f32, sat: f32, light: f32) -> (u8, u8, u8) {
    let a = sat * light.min(1.0 - light);
    let channel = |n: f32| {
        let k = (n + hue / 30.0) % 12.0;
        let v = light - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    (channel(0.0), channel(8.0), channel(4.0))
}
