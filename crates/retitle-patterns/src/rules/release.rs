//! Posted-name cascades: TV, movie, game and application dialects.

use super::tokens::{
    AUDIO_CODEC, EPISODE, EPISODE_WIDE, LANGUAGE, LEAD, RESOLUTION, SEP, SOURCE, SOURCE_LOOSE,
    TAIL, TEXT, VIDEO_CODEC, YEAR, assemble,
};
use super::{Extraction, PatternRule, RuleFamily, compile};
use crate::error::PatternResult;

fn whole(label: &'static str, family: RuleFamily, parts: &[&str]) -> PatternResult<PatternRule> {
    let pattern = compile(label, &assemble(parts))?;
    Ok(PatternRule::new(label, family, pattern, Extraction::Whole))
}

pub(super) fn tv_rules() -> PatternResult<Vec<PatternRule>> {
    let family = RuleFamily::Tv;
    Ok(vec![
        whole(
            "tv: Title.SxxExx.Text.source.group",
            family,
            &[LEAD, EPISODE_WIDE, r"[-\w.',;()]+", SOURCE, SEP, TAIL],
        )?,
        whole(
            "tv: Title.SxxExx.Text.year.group",
            family,
            &[LEAD, EPISODE, TEXT, YEAR, TAIL],
        )?,
        whole(
            "tv: Title.SxxExx.Text.resolution.source.vcodec.group",
            family,
            &[LEAD, EPISODE, TEXT, RESOLUTION, SEP, SOURCE, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "tv: Title.SxxExx.source.vcodec.group",
            family,
            &[LEAD, EPISODE, SEP, SOURCE, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "tv: Title.SxxExx.acodec.source.res.vcodec.group",
            family,
            &[
                LEAD,
                EPISODE,
                SEP,
                AUDIO_CODEC,
                SEP,
                SOURCE,
                SEP,
                RESOLUTION,
                SEP,
                VIDEO_CODEC,
                TAIL,
            ],
        )?,
        // Same shape as the year dialect above, so it only fires if that rule is removed.
        whole(
            "tv: Title.SxxExx.resolution.source.vcodec.group",
            family,
            &[LEAD, EPISODE, TEXT, YEAR, TAIL],
        )?,
        whole(
            "tv: Title.year.###(season/episode).source.group",
            family,
            &[LEAD, YEAR, SEP, EPISODE, SEP, SOURCE, TAIL],
        )?,
        whole(
            "tv: Sports",
            family,
            &[
                r"\w(19|20)\d\d[._ -]\d{2}[._ -]\d{2}[._ -](IndyCar|NBA|NCW(T|Y)S|NNS|NSCS?)([._ -](19|20)\d\d)?",
                TAIL,
            ],
        )?,
    ])
}

pub(super) fn movie_rules() -> PatternResult<Vec<PatternRule>> {
    let family = RuleFamily::Movie;
    Ok(vec![
        whole(
            "movie: Title.year.Text.res.vcod.group",
            family,
            &[LEAD, YEAR, TEXT, RESOLUTION, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.year.source.vcodec.res.group",
            family,
            &[LEAD, YEAR, SEP, SOURCE, SEP, VIDEO_CODEC, SEP, RESOLUTION, TAIL],
        )?,
        whole(
            "movie: Title.year.source.vcodec.acodec.group",
            family,
            &[LEAD, YEAR, SEP, SOURCE, SEP, VIDEO_CODEC, SEP, AUDIO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.year.language.acodec.source.vcodec.group",
            family,
            &[LEAD, LANGUAGE, SEP, AUDIO_CODEC, SEP, SOURCE, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.year.resolution.source.acodec.vcodec.group",
            family,
            &[
                LEAD,
                YEAR,
                SEP,
                RESOLUTION,
                SEP,
                SOURCE,
                SEP,
                AUDIO_CODEC,
                SEP,
                VIDEO_CODEC,
                TAIL,
            ],
        )?,
        whole(
            "movie: Title.year.resolution.source.vcodec.group",
            family,
            &[LEAD, YEAR, SEP, RESOLUTION, SEP, SOURCE, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.year.source.resolution.acodec.vcodec.group",
            family,
            &[
                LEAD,
                YEAR,
                SEP,
                SOURCE,
                SEP,
                RESOLUTION,
                SEP,
                AUDIO_CODEC,
                SEP,
                VIDEO_CODEC,
                TAIL,
            ],
        )?,
        whole(
            "movie: Title.year.resolution.acodec.vcodec.group",
            family,
            &[LEAD, YEAR, SEP, RESOLUTION, SEP, AUDIO_CODEC, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.year.source.res.group",
            family,
            &[TEXT, YEAR, SEP, SOURCE_LOOSE, SEP, RESOLUTION, SEP, TAIL],
        )?,
        whole(
            "movie: Title.year.eptitle.source.vcodec.group",
            family,
            &[LEAD, YEAR, SEP, TEXT, SEP, SOURCE_LOOSE, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.resolution.source.acodec.vcodec.group",
            family,
            &[LEAD, RESOLUTION, SEP, SOURCE, SEP, AUDIO_CODEC, SEP, VIDEO_CODEC, TAIL],
        )?,
        whole(
            "movie: Title.resolution.acodec.eptitle.source.year.group",
            family,
            &[LEAD, RESOLUTION, SEP, AUDIO_CODEC, TEXT, SOURCE, SEP, YEAR, TAIL],
        )?,
        whole(
            "movie: Title.language.year.acodec.src",
            family,
            &[LEAD, LANGUAGE, SEP, YEAR, SEP, AUDIO_CODEC, SEP, SOURCE, TAIL],
        )?,
    ])
}

pub(super) fn game_rules() -> PatternResult<Vec<PatternRule>> {
    let family = RuleFamily::Game;
    let outlaws = "game: PC Games -OUTLAWS";
    let alias = "game: PC Games -ALiAS";
    Ok(vec![
        whole(
            "game: Videogames 1",
            family,
            &[
                LEAD,
                r"(ASIA|DLC|EUR|GOTY|JPN|KOR|MULTI\d|NTSCU?|PAL|RF|Region[._ -]?Free|USA|XBLA)",
                SEP,
                r"(DLC[._ -]Complete|FRENCH|GERMAN|MULTI\d|PROPER|PSN|READ[._ -]?NFO|UMD)?",
                r"[._ -]?(GC|NDS|NGC|PS3|PSP|WII|XBOX(360)?)",
                TAIL,
            ],
        )?,
        whole(
            "game: Videogames 2",
            family,
            &[
                LEAD,
                r"(GC|NDS|NGC|PS3|WII|XBOX(360)?)",
                SEP,
                r"(DUPLEX|iNSOMNi|OneUp|STRANGE|SWAG|SKY)",
                TAIL,
            ],
        )?,
        PatternRule::new(
            outlaws,
            family,
            compile(outlaws, r"\w[\w.',;-].+-OUTLAWS")?,
            Extraction::Replace {
                group: 0,
                pairs: &[("OUTLAWS", "PC GAME OUTLAWS")],
            },
        ),
        PatternRule::new(
            alias,
            family,
            compile(alias, r"\w[\w.',;-].+-ALiAS")?,
            Extraction::Replace {
                group: 0,
                pairs: &[("-ALiAS", " PC GAME ALiAS")],
            },
        ),
    ])
}

pub(super) fn app_rules() -> PatternResult<Vec<PatternRule>> {
    let family = RuleFamily::App;
    Ok(vec![
        whole(
            "app: Apps 1",
            family,
            &[
                LEAD,
                r"(\d{1,10}|Linux|UNIX)[._ -](RPM)?[._ -]?(X64)?[._ -]?(Incl)[._ -](Keygen)",
                TAIL,
            ],
        )?,
        whole(
            "app: Apps 2",
            family,
            &[LEAD, r"\d{1,8}[._ -](winall-freeware)", TAIL],
        )?,
    ])
}
