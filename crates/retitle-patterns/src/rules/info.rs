//! Info-file dialects, including the synthesising `Title (Year)` rule.

use regex::{Captures, Regex};

use super::tokens::{SOURCE, assemble};
use super::{Extraction, Guard, PatternRule, RuleFamily, compile};
use crate::error::PatternResult;

const GAME_GROUPS: &str = r"ALiAS|BAT-TEAM|FAiRLiGHT|Game Type|Glamoury|HI2U|iTWINS|JAGUAR|(LARGE|MEDIUM)ISO|MAZE|nERv|PROPHET|PROFiT|PROCYON|RELOADED|REVOLVER|ROGUE|ViTALiTY";

pub(super) fn info_rules() -> PatternResult<Vec<PatternRule>> {
    let mut rules = Vec::new();
    rules.extend(tv_rules()?);
    rules.extend(movie_rules()?);
    rules.push(music_rule()?);
    rules.push(title_year_rule()?);
    rules.extend(game_rules()?);
    rules.push(supplier_rule()?);
    Ok(rules)
}

fn tv_rules() -> PatternResult<Vec<PatternRule>> {
    let first = "nfo: Generic TV 1";
    let second = "nfo: Generic TV 2";
    Ok(vec![
        PatternRule::new(
            first,
            RuleFamily::NfoTv,
            compile(
                first,
                r":\s*.*[\\/]([A-Z0-9].+?S\d+[-._ ]?[ED]\d+.+?)\.\w{2,}\s+",
            )?,
            Extraction::Group(1),
        ),
        PatternRule::new(
            second,
            RuleFamily::NfoTv,
            compile(
                second,
                r"(:\s+)(.+?S\d{1,3}[-._ ]?[ED]\d{1,3}.+?)(\s{2,}|\r|\n)",
            )?,
            Extraction::Group(2),
        ),
    ])
}

fn movie_rules() -> PatternResult<Vec<PatternRule>> {
    let first = "nfo: Generic Movies 1";
    let second = "nfo: Generic Movies 2";
    let third = "nfo: Generic Movies 3";
    Ok(vec![
        PatternRule::new(
            first,
            RuleFamily::NfoMovie,
            compile(
                first,
                r"(:\s+)(.+?(19|20)\d\d.+?(BDRip|bluray|DVD(R|Rip)?|XVID).+?)(\s{2,}|\r|\n)",
            )?,
            Extraction::Group(2),
        ),
        PatternRule::new(
            second,
            RuleFamily::NfoMovie,
            compile(
                second,
                r"(\s{2,})(.+?[-._ ](19|20)\d\d.+?(BDRip|bluray|DVD(R|Rip)?|XVID).+?)(\s{2,}|\r|\n)",
            )?,
            Extraction::GroupUnlessPrefixed {
                group: 2,
                prefix: "Source",
            },
        ),
        PatternRule::new(
            third,
            RuleFamily::NfoMovie,
            compile(
                third,
                r"(\s{2,})(.+?[-._ ](NTSC|MULTi).+?(MULTi|DVDR)[-._ ].+?)(\s{2,}|\r|\n)",
            )?,
            Extraction::Group(2),
        ),
    ])
}

fn music_rule() -> PatternResult<PatternRule> {
    let label = "nfo: Music FM RADIO";
    Ok(PatternRule::new(
        label,
        RuleFamily::NfoMusic,
        compile(label, r"\s{2,}(.+?-FM-\d{2}-\d{2})")?,
        Extraction::Replace {
            group: 1,
            pairs: &[("-FM-", "-FM-Radio-MP3-")],
        },
    ))
}

fn title_year_rule() -> PatternResult<PatternRule> {
    let label = "nfo: Title (Year)";
    let probes = TitleYearProbes::compile()?;
    Ok(PatternRule::new(
        label,
        RuleFamily::NfoTitleYear,
        compile(
            label,
            r#"\w[-\w`~!@#$%^&*()_+={}|"<>?\[\];',./ ]+\s?\((19|20)\d\d\)"#,
        )?,
        Extraction::Synthesize(Box::new(move |caps: &Captures<'_>, text: &str| {
            caps.get(0)
                .map(|base| probes.synthesize(base.as_str(), text))
        })),
    )
    .with_guard(Guard::Rejects(compile(label, r"\.pdf|Audio ?Book")?)))
}

fn game_rules() -> PatternResult<Vec<PatternRule>> {
    let copyright = "nfo: PC Games (c)";
    let iso = "nfo: PC Games *ISO*";
    Ok(vec![
        PatternRule::new(
            copyright,
            RuleFamily::NfoGame,
            compile(
                copyright,
                r"\w[\w.+&*/()',;: -]+\(c\)[-\w.',;& ]+\w",
            )?,
            Extraction::Replace {
                group: 0,
                pairs: &[("(c)", "(GAMES) (c)"), ("(C)", "(GAMES) (c)")],
            },
        )
        .with_guard(Guard::Requires(compile(copyright, GAME_GROUPS)?)),
        PatternRule::new(
            iso,
            RuleFamily::NfoGame,
            compile(iso, r"\w[\w.+&*/()',;: -]+\*ISO\*")?,
            Extraction::Replace {
                group: 0,
                pairs: &[("*ISO*", "*ISO* (PC GAMES)")],
            },
        )
        .with_guard(Guard::Requires(compile(iso, GAME_GROUPS)?)),
    ])
}

fn supplier_rule() -> PatternResult<PatternRule> {
    let label = "nfo: IGUANA";
    let probes = SupplierProbes::compile()?;
    Ok(PatternRule::new(
        label,
        RuleFamily::NfoMisc,
        compile(label, r"Supplier.+?IGUANA")?,
        Extraction::Synthesize(Box::new(move |_caps: &Captures<'_>, text: &str| {
            probes.synthesize(text)
        })),
    ))
}

/// Field probes appended to a `Title (Year)` base, each independently optional.
struct TitleYearProbes {
    language: Regex,
    resolution: Regex,
    width: Regex,
    source: Regex,
    video: Regex,
    audio: Regex,
}

impl TitleYearProbes {
    fn compile() -> PatternResult<Self> {
        Ok(Self {
            language: compile(
                "nfo probe: language",
                r"(idiomas|lang|language|langue|sprache).*?\b(?P<lang>Brazilian|Chinese|Croatian|Danish|DE|Deutsch|Dutch|Estonian|ES|English|Englisch|Finnish|Flemish|Francais|French|FR|German|Greek|Hebrew|Icelandic|Italian|Japenese|Japan|Japanese|Korean|Latin|Nordic|Norwegian|Polish|Portuguese|Russian|Serbian|Slovenian|Swedish|Spanisch|Spanish|Thai|Turkish)\b",
            )?,
            resolution: compile(
                "nfo probe: resolution",
                r"(frame size|(video )?res(olution)?|video).*?(?P<res>(272|336|480|494|528|608|\(?640|688|704|720x480|810|816|820|1 ?080|1280( @)?|1 ?920(x1080)?))",
            )?,
            width: compile(
                "nfo probe: width",
                r"(largeur|width).*?(?P<res>(\(?640|688|704|720|1280( @)?|1 ?920))",
            )?,
            source: compile(
                "nfo probe: source",
                &assemble(&[r"source.*?\b(?P<source>", SOURCE, r")\b"]),
            )?,
            video: compile(
                "nfo probe: video codec",
                r"(codec( (name|code))?|(original )?format|res(olution)|video( (codec|format|res))?|tv system|type|writing library).*?\b(?P<video>AVC|AVI|DBrip|DIVX|\(Divx|DVD|[HX][._ -]?264|MPEG-4 Visual|NTSC|PAL|WMV|XVID)\b",
            )?,
            audio: compile(
                "nfo probe: audio codec",
                r"(audio( format)?|codec( name)?|format).*?\b(?P<audio>0x0055 MPEG-1 Layer 3|AAC( LC)?|AC-?3|\(AC3|DD5(.1)?|(A_)?DTS-?(HD)?|Dolby(\s?TrueHD)?|TrueHD|FLAC|MP3)\b",
            )?,
        })
    }

    fn synthesize(&self, base: &str, text: &str) -> String {
        let mut title = base.to_string();
        let mut append = |token: &str| {
            title.push('.');
            title.push_str(token);
        };

        if let Some(language) = named(&self.language, text, "lang") {
            append(normalize_language(language));
        }

        if let Some(resolution) = named(&self.resolution, text, "res") {
            append(normalize_resolution(resolution));
        } else if let Some(width) = named(&self.width, text, "res") {
            append(normalize_width(width));
        }

        if let Some(source) = named(&self.source, text, "source") {
            append(normalize_source(source));
        } else if let Some(video) = named(&self.video, text, "video") {
            append(normalize_video(video));
        }

        if let Some(audio) = named(&self.audio, text, "audio") {
            append(normalize_audio(audio));
        }

        title.push_str("-NoGroup");
        title
    }
}

/// Supplier probes; a supplier title requires a `Title (Year)` line.
struct SupplierProbes {
    title: Regex,
    language: Regex,
    audio: Regex,
    format: Regex,
    resolution: Regex,
}

impl SupplierProbes {
    fn compile() -> PatternResult<Self> {
        Ok(Self {
            title: compile(
                "supplier probe: title",
                r#"\w[-\w`~!@#$%^&*()+={}|:"<>?\[\];',./ ]+\s\((19|20)\d\d\)"#,
            )?,
            language: compile(
                "supplier probe: language",
                r"\s\[\*\] (English|Dutch|French|German|Spanish)\b",
            )?,
            audio: compile(
                "supplier probe: audio",
                r"\s\[\*\] (DT?S [2567][._ -][0-2]( MONO)?)\b",
            )?,
            format: compile(
                "supplier probe: format",
                r"Format.+(DVD(5|9|R)?|[HX][._ -]?264)\b",
            )?,
            resolution: compile(
                "supplier probe: resolution",
                r"\[(640x.+|1280x.+|1920x.+)\] Resolution\b",
            )?,
        })
    }

    fn synthesize(&self, text: &str) -> Option<String> {
        let mut title = self.title.find(text)?.as_str().to_string();
        for probe in [&self.language, &self.audio, &self.format] {
            if let Some(token) = group(probe, text, 1) {
                title.push('.');
                title.push_str(token);
            }
        }
        if let Some(resolution) = group(&self.resolution, text, 1) {
            title.push('.');
            title.push_str(normalize_frame(resolution));
        }
        title.push_str(".IGUANA");
        Some(title)
    }
}

fn named<'t>(probe: &Regex, text: &'t str, name: &str) -> Option<&'t str> {
    probe
        .captures(text)
        .and_then(|caps| caps.name(name))
        .map(|m| m.as_str())
}

fn group<'t>(probe: &Regex, text: &'t str, index: usize) -> Option<&'t str> {
    probe
        .captures(text)
        .and_then(|caps| caps.get(index))
        .map(|m| m.as_str())
}

fn normalize_language(raw: &str) -> &str {
    match raw {
        "DE" => "DUTCH",
        "Englisch" => "ENGLISH",
        "FR" => "FRENCH",
        "ES" => "SPANISH",
        other => other,
    }
}

fn normalize_resolution(raw: &str) -> &str {
    match raw {
        "272" | "336" | "480" | "494" | "608" | "640" | "(640" | "688" | "704" | "720x480" => {
            "480p"
        }
        "1280x720" | "1280" | "1280 @" => "720p",
        "810" | "816" | "820" | "1920" | "1 920" | "1080" | "1 080" | "1920x1080" => "1080p",
        other => other,
    }
}

fn normalize_width(raw: &str) -> &str {
    match raw {
        "640" | "(640" | "688" | "704" | "720" => "480p",
        "1280 @" | "1280" => "720p",
        "1920" | "1 920" => "1080p",
        other => other,
    }
}

fn normalize_source(raw: &str) -> &str {
    match raw {
        "BD" => "Bluray.x264",
        "CAMRIP" => "CAM",
        "DBrip" => "BDRIP",
        "DVD R1" | "NTSC" | "PAL" | "VOD" => "DVD",
        "HD" => "HDTV",
        "Ripped " => "DVDRIP",
        other => other,
    }
}

fn normalize_video(raw: &str) -> &str {
    match raw {
        "AVI" => "DVDRIP",
        "DBrip" => "BDRIP",
        "(Divx" => "DIVX",
        "h264" | "h-264" | "h.264" => "H264",
        "MPEG-4 Visual" | "x264" | "x-264" | "x.264" => "x264",
        "NTSC" | "PAL" => "DVD",
        other => other,
    }
}

fn normalize_audio(raw: &str) -> &str {
    match raw {
        "0x0055 MPEG-1 Layer 3" => "MP3",
        "AC-3" | "(AC3" => "AC3",
        "AAC LC" => "AAC",
        "A_DTS" | "DTS-HD" | "DTSHD" => "DTS",
        other => other,
    }
}

fn normalize_frame(raw: &str) -> &str {
    if raw.starts_with("640x") {
        "480p"
    } else if raw.starts_with("1280x") {
        "720p"
    } else if raw.starts_with("1920x") {
        "1080p"
    } else {
        raw
    }
}
