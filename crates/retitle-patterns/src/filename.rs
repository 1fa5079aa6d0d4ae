//! Filename normalisation for catalog filename matching.

use regex::Regex;

/// Date token and trailing text extracted from a normalised filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameKey {
    /// `NN.NN.NN` token shared by the item and catalog filename.
    pub token: String,
    /// Text following the token, without leading separators.
    pub suffix: String,
}

/// Normalise a listing entry: strip the container extension and any `.partNN` or
/// `.volNN+NN` suffix, drop the directory prefix and a leading `NN-` track number.
///
/// Names starting with a period are returned untouched apart from control characters.
#[must_use]
pub fn normalize_filename(name: &str) -> String {
    let printable: String = name.chars().filter(|ch| !ch.is_control()).collect();
    if printable.is_empty() || printable.starts_with('.') {
        return printable;
    }

    let mut stem = cut_extension(&printable);
    if has_split_suffix(stem) {
        stem = cut_extension(stem);
    }
    let base = stem.rsplit(['\\', '/']).next().unwrap_or(stem);
    strip_track_number(base).to_string()
}

pub(crate) fn extract_key(date_token: &Regex, normalized: &str) -> Option<FilenameKey> {
    let caps = date_token.captures(normalized)?;
    let token = caps.get(1)?.as_str();
    let suffix = caps
        .get(2)?
        .as_str()
        .trim_start_matches(['.', '-', '_']);
    if suffix.is_empty() {
        return None;
    }
    Some(FilenameKey {
        token: token.to_string(),
        suffix: suffix.to_string(),
    })
}

fn cut_extension(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

fn has_split_suffix(stem: &str) -> bool {
    let Some((_, tail)) = stem.rsplit_once('.') else {
        return false;
    };
    if let Some(number) = tail.strip_prefix("part") {
        return is_digits(number);
    }
    if let Some(volume) = tail.strip_prefix("vol") {
        return match volume.split_once('+') {
            Some((first, second)) => is_digits(first) && is_digits(second),
            None => is_digits(volume),
        };
    }
    false
}

fn strip_track_number(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() > 3 && bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit() && bytes[2] == b'-'
    {
        &name[3..]
    } else {
        name
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_extension_and_directory() {
        assert_eq!(
            normalize_filename("Folder\\Sub/Some.Show.20.01.15.720p-GRP.mkv"),
            "Some.Show.20.01.15.720p-GRP"
        );
    }

    #[test]
    fn normalize_strips_part_and_volume_suffixes() {
        assert_eq!(normalize_filename("Show.20.01.15.x264.part01.rar"), "Show.20.01.15.x264");
        assert_eq!(normalize_filename("Show.20.01.15.x264.vol03+04.par2"), "Show.20.01.15.x264");
        assert_eq!(normalize_filename("Show.20.01.15.x264.vol07.par2"), "Show.20.01.15.x264");
    }

    #[test]
    fn normalize_strips_leading_track_number() {
        assert_eq!(normalize_filename("01-Artist-Track.20.01.15.mp3"), "Artist-Track.20.01.15");
    }

    #[test]
    fn normalize_leaves_dot_prefixed_names() {
        assert_eq!(normalize_filename(".hidden.file"), ".hidden.file");
    }

    #[test]
    fn extract_key_splits_token_and_suffix() -> Result<(), regex::Error> {
        let date = Regex::new(r"(\d{2}\.\d{2}\.\d{2})([-\w.]+\w)$")?;
        let key = extract_key(&date, "Some.Show.20.01.15.720p-GRP");
        assert_eq!(
            key,
            Some(FilenameKey {
                token: "20.01.15".to_string(),
                suffix: "720p-GRP".to_string(),
            })
        );
        assert_eq!(extract_key(&date, "No.Date.Here"), None);
        Ok(())
    }
}
