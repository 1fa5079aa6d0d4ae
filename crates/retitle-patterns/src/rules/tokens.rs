//! Shared expression fragments assembled into rule patterns.

/// Leading title text: a word character followed by title punctuation.
pub(crate) const LEAD: &str = r"\w[-\w.',;& ]+";
/// Free text between tokens.
pub(crate) const TEXT: &str = r"[-\w.',;& ]+";
/// Trailing text ending on a word character (usually the group tag).
pub(crate) const TAIL: &str = r"[-\w.',;& ]+\w";
/// Single token separator.
pub(crate) const SEP: &str = r"[._ -]";

/// Season/episode marker.
pub(crate) const EPISODE: &str = r"((s\d{1,2}[._ -]?[bde]\d{1,2})|\d{1,2}x\d{2}|ep[._ -]?\d{2})";
/// Season/episode marker that also accepts `|` delimited `SxxExx` forms.
pub(crate) const EPISODE_WIDE: &str =
    r"((s\d{1,2}[._ -]?[bde]\d{1,2})|[S|]\d{1,2}[E|x]\d+|ep[._ -]?\d{2})";
/// Four digit year in the 1900s or 2000s.
pub(crate) const YEAR: &str = r"((19|20)\d\d)";
/// Vertical resolution with scan type.
pub(crate) const RESOLUTION: &str = r"(480|720|1080)[ip]";

/// Source medium.
pub(crate) const SOURCE: &str = r"(BD(-?(25|50|RIP))?|Blu-?Ray ?(3D)?|BRRIP|CAM(RIP)?|DBrip|DTV|DVD-?(5|9|(R(IP)?|scr(eener)?))?|[HPS]D?(RIP|TV(RIP)?)?|NTSC|PAL|R5|Ripped |S?VCD|scr(eener)?|SAT(RIP)?|TS|VHS(RIP)?|VOD|WEB-DL)";
/// Source medium accepting a bare `BR` token.
pub(crate) const SOURCE_LOOSE: &str = r"(BD(-?(25|50|RIP))?|Blu-?Ray ?(3D)?|BR(RIP)?|CAM(RIP)?|DBrip|DTV|DVD-?(5|9|(R(IP)?|scr(eener)?))?|[HPS]D?(RIP|TV(RIP)?)?|NTSC|PAL|R5|Ripped |S?VCD|scr(eener)?|SAT(RIP)?|TS|VHS(RIP)?|VOD|WEB-DL)";
/// Video codec.
pub(crate) const VIDEO_CODEC: &str = r"(DivX|[HX][._ -]?264|MPEG2|XviD(HD)?|WMV)";
/// Audio codec.
pub(crate) const AUDIO_CODEC: &str =
    r"(AAC( LC)?|AC-?3|DD5([._ -]1)?|(A_)?DTS-?(HD)?|Dolby( ?TrueHD)?|MP3|TrueHD)";
/// Spoken language.
pub(crate) const LANGUAGE: &str = r"(Brazilian|Chinese|Croatian|Danish|Deutsch|Dutch|Estonian|English|Finnish|Flemish|Francais|French|German|Greek|Hebrew|Icelandic|Italian|Japenese|Japan|Japanese|Korean|Latin|Nordic|Norwegian|Polish|Portuguese|Russian|Serbian|Slovenian|Swedish|Spanisch|Spanish|Thai|Turkish)";

/// Scene release name: separated tokens ending in `-group`.
pub(crate) const SCENE_NAME: &str = r"[\w()]+[\s._-]([\w()]+[\s._-])+[\w()]+-\w+";
/// Signature of an obfuscated info-file body.
pub(crate) const OBFUSCATED: &str = r"^=newz\[NZB\]=\w+";
/// Info-file line naming provenance rather than a title.
pub(crate) const PROVENANCE_LINE: &str = r"(?i)Source\s:";
/// Date token and suffix of a normalised filename.
pub(crate) const FILENAME_DATE: &str = r"(\d{2}\.\d{2}\.\d{2})([-\w.]+\w)$";

/// Concatenate fragments into one expression.
pub(crate) fn assemble(parts: &[&str]) -> String {
    parts.concat()
}
