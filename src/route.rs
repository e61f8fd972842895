/// Segment that separates a gallery page path from a photo number.
const PHOTO_SEGMENT: &str = "photo/";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Gallery state encoded in an address-bar path.
pub struct NavigationState {
    /// Path of the gallery page, everything before a trailing `photo/<n>`.
    pub base_path: String,
    /// 1-based photo position, `None` when the gallery is closed.
    pub current_index: Option<usize>,
}

/// Parses a trailing `/photo/<digits>` segment out of `location`.
///
/// Total over any input. A missing, non-numeric or unrepresentable photo
/// number yields `current_index: None`, which callers treat as "gallery
/// closed". Zero is not a valid photo number and is treated the same way.
pub fn derive_state_from_location(location: &str) -> NavigationState {
    let Some((base_path, digits)) = split_photo_segment(location) else {
        return NavigationState {
            base_path: location.to_string(),
            current_index: None,
        };
    };

    let current_index = digits.parse::<usize>().ok().filter(|&n| n > 0);
    NavigationState {
        base_path: base_path.to_string(),
        current_index,
    }
}

/// Splits `<base>/photo/<digits>` into `("<base>/", "<digits>")`.
fn split_photo_segment(location: &str) -> Option<(&str, &str)> {
    let before_digits = location.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &location[before_digits.len()..];
    if digits.is_empty() {
        return None;
    }
    let head = before_digits.strip_suffix(PHOTO_SEGMENT)?;
    if !head.ends_with('/') {
        return None;
    }
    Some((head, digits))
}

/// Address-bar path of the 1-based photo `number` under `base_path`.
pub fn photo_path(base_path: &str, number: usize) -> String {
    if base_path.ends_with('/') {
        format!("{}{}{}", base_path, PHOTO_SEGMENT, number)
    } else {
        format!("{}/{}{}", base_path, PHOTO_SEGMENT, number)
    }
}

/// History title used for the 1-based photo `number`.
pub fn photo_title(number: usize) -> String {
    format!("Photo {}", number)
}
