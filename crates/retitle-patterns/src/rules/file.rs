//! File listing dialects.

use regex::Captures;

use super::tokens::{
    EPISODE, LEAD, RESOLUTION, SCENE_NAME, SEP, SOURCE, TAIL, VIDEO_CODEC, assemble,
};
use super::{Extraction, Guard, PatternRule, RuleFamily, compile, compile_exact};
use crate::error::PatternResult;

const FAMILY: RuleFamily = RuleFamily::File;

fn rule(
    label: &'static str,
    pattern: &str,
    extraction: Extraction,
) -> PatternResult<PatternRule> {
    Ok(PatternRule::new(
        label,
        FAMILY,
        compile(label, pattern)?,
        extraction,
    ))
}

pub(super) fn file_rules() -> PatternResult<Vec<PatternRule>> {
    let videoot = "file: XXX XviD VIDEOOT";
    let folder = "file: Folder name";
    Ok(vec![
        rule(
            "file: TVP",
            r"^(.+?(x264|XviD)-TVP)\\",
            Extraction::Group(1),
        )?,
        rule(
            "file: Generic TV",
            r"^(\\|/)?(.+(\\|/))*(.+?S\d{1,3}[-._ ]?[ED]\d{1,3}.+)\.(.+)$",
            Extraction::Group(4),
        )?,
        rule(
            "file: Generic movie 1",
            r"^(\\|/)?(.+(\\|/))*(.+?([-._ ]\d{4}[-._ ].+?(BDRip|bluray|DVDRip|XVID)).+)\.(.+)$",
            Extraction::Group(4),
        )?,
        rule(
            "file: Generic movie 2",
            r"^([-a-z0-9._]+(19|20)\d\d[-a-z0-9._]+[-._ ](720p|1080p|BDRip|bluray|DVDRip|x264|XviD)[-a-z0-9._]+)\.[a-z]{2,}$",
            Extraction::Group(1),
        )?,
        rule(
            "file: Generic music",
            r"(.+?([-._ ](CD|FM)|[-._ ]\dCD|CDR|FLAC|SAT|WEB).+?(19|20)\d\d.+?)\\.+",
            Extraction::Group(1),
        )?,
        rule(
            "file: music groups",
            r"^(.+?(19|20)\d\d-([a-z0-9]{3}|[a-z]{2,}|C4))\\",
            Extraction::Group(1),
        )?,
        rule(
            "file: Movie (year) avi",
            r".+\\(.+\((19|20)\d\d\)\.avi)",
            Extraction::Replace {
                group: 1,
                pairs: &[(".avi", " DVDRip XVID NoGroup")],
            },
        )?,
        rule(
            "file: Movie (year) iso",
            r".+\\(.+\((19|20)\d\d\)\.iso)",
            Extraction::Replace {
                group: 1,
                pairs: &[(".iso", " DVD NoGroup")],
            },
        )?,
        rule(
            "file: XXX Imagesets",
            r"^(.+?IMAGESET.+?)\\.+",
            Extraction::Group(1),
        )?,
        PatternRule::new(
            videoot,
            FAMILY,
            compile_exact(
                videoot,
                r"^VIDEOOT-[A-Z0-9]+\\([\w!.,& ()\[\]'`-]{8,}?\b.?)([-_](proof|sample|thumbs?))*(\.part\d*(\.rar)?|\.rar|\.7z)?(\d{1,3}\.rev|\.vol.+?|\.mp4)",
            )?,
            Extraction::Decorate {
                group: 1,
                prefix: "",
                suffix: " XXX DVDRIP XviD-VIDEOOT",
            },
        ),
        rule(
            "file: R&C",
            r"(\w[-\w.',;& ]+1080i[._ -]DD5[._ -]1[._ -]MPEG2-R&C)\.ts",
            Extraction::Replace {
                group: 1,
                pairs: &[("MPEG2", "MPEG2.HDTV")],
            },
        )?,
        rule(
            "file: NhaNc3",
            &assemble(&[
                LEAD,
                EPISODE,
                SEP,
                RESOLUTION,
                SEP,
                SOURCE,
                SEP,
                "nSD",
                SEP,
                VIDEO_CODEC,
                SEP,
                "NhaNC3",
                TAIL,
            ]),
            Extraction::Whole,
        )?,
        rule(
            "file: tvp",
            &assemble(&[
                r"(\wtvp-[-\w.',;]+",
                EPISODE,
                SEP,
                r"(720p|1080p|xvid))\.(avi|mkv)",
            ]),
            Extraction::Replace {
                group: 1,
                pairs: &[
                    ("720p", "720p.HDTV.X264"),
                    ("1080p", "1080p.Bluray.X264"),
                    ("xvid", "XVID.DVDrip"),
                ],
            },
        )?,
        rule(
            "file: Title.211.hdtv-lol.extension",
            r"\w[-\w.',;& ]+\d{3,4}\.hdtv-lol\.(avi|mp4|mkv|ts|nfo|nzb)",
            Extraction::Whole,
        )?,
        rule(
            "file: Title-SxxExx-XVID-DL.avi",
            r"\w[-\w.',;& ]+-S\d{1,2}[EX]\d{1,2}-XVID-DL.avi",
            Extraction::Whole,
        )?,
        rule(
            "file: Title - SxxExx - Eptitle",
            r"\S.*[-\w.',;]+\s-\ss\d{2}[ex]\d{2}\s-\s[-\w.',;].+\.",
            Extraction::Whole,
        )?,
        rule(
            "file: ).nds Nintendo DS",
            r"\w.+?\)\.nds",
            Extraction::Whole,
        )?,
        rule(
            "file: .3ds Nintendo 3DS",
            r"3DS_\d{4}.+\d{4} - (.+?)\.3ds",
            Extraction::Decorate {
                group: 1,
                prefix: "3DS ",
                suffix: "",
            },
        )?,
        rule(
            "file: EBook",
            r"\w.+?\.(epub|mobi|azw|opf|fb2|prc|djvu|cb[rz])",
            Extraction::Synthesize(Box::new(|caps: &Captures<'_>, _text: &str| {
                let whole = caps.get(0)?.as_str();
                let extension = caps.get(1)?.as_str();
                Some(whole.replace(&format!(".{extension}"), &format!(" ({extension})")))
            })),
        )?,
        PatternRule::new(
            folder,
            FAMILY,
            compile(folder, r"\w[-\w.',;& ]+")?,
            Extraction::Whole,
        )
        .with_guard(Guard::Requires(compile_exact(folder, SCENE_NAME)?)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(rules: &[PatternRule], text: &str) -> Option<(&'static str, String)> {
        rules
            .iter()
            .find_map(|rule| rule.extract(text).map(|title| (rule.label(), title)))
    }

    #[test]
    fn generic_tv_strips_directories_and_extension() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) = first_match(&rules, "Some Dir/Show.Name.S01E02.720p.mkv")
            .ok_or("no file rule fired")?;
        assert_eq!(label, "file: Generic TV");
        assert_eq!(title, "Show.Name.S01E02.720p");
        Ok(())
    }

    #[test]
    fn tvp_folder_wins_over_generic_tv() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) =
            first_match(&rules, "show.s01e02.720p.hdtv.x264-TVP\\show.s01e02.mkv")
                .ok_or("no file rule fired")?;
        assert_eq!(label, "file: TVP");
        assert_eq!(title, "show.s01e02.720p.hdtv.x264-TVP");
        Ok(())
    }

    #[test]
    fn movie_avi_gets_medium_marker() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) = first_match(&rules, "Films\\Old Classic (1958).avi")
            .ok_or("no file rule fired")?;
        assert_eq!(label, "file: Movie (year) avi");
        assert_eq!(title, "Old Classic (1958) DVDRip XVID NoGroup");
        Ok(())
    }

    #[test]
    fn tvp_release_expands_markers() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) = first_match(&rules, "atvp-show.name.s02e03.720p.mkv")
            .ok_or("no file rule fired")?;
        assert_eq!(label, "file: tvp");
        assert_eq!(title, "atvp-show.name.s02e03.720p.HDTV.X264");
        Ok(())
    }

    #[test]
    fn ebook_extension_is_parenthesized() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) =
            first_match(&rules, "Author - Book Title.epub").ok_or("no file rule fired")?;
        assert_eq!(label, "file: EBook");
        assert_eq!(title, "Author - Book Title (epub)");
        Ok(())
    }

    #[test]
    fn folder_name_requires_scene_shape() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (label, title) =
            first_match(&rules, "Some_Release_Name-GRP").ok_or("no file rule fired")?;
        assert_eq!(label, "file: Folder name");
        assert_eq!(title, "Some_Release_Name-GRP");
        assert!(first_match(&rules, "plainword").is_none());
        Ok(())
    }

    #[test]
    fn nintendo_3ds_dump_is_prefixed() -> Result<(), Box<dyn std::error::Error>> {
        let rules = file_rules()?;
        let (_, title) = first_match(&rules, "3DS_0123_Dump_0456 - Puzzle Quest.3ds")
            .ok_or("no file rule fired")?;
        assert_eq!(title, "3DS Puzzle Quest");
        Ok(())
    }
}
