use std::path::Path;

/// Frame number encoded as the trailing digits of a file stem.
///
/// Capture tools name sub-frames like `take0042.tga`; anything without a
/// numeric suffix (or one that overflows `u64`) yields `None`.
pub fn frame_number_from_path(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    stem[stem.len() - digits..].parse().ok()
}
