//! Optional release-name enrichment.
//!
//! Scans the tokens of a release name for well-known markers and fills the
//! record's media fields. The first match wins for every field except the
//! year, where the last candidate wins. Grouping never reads these fields.

use crate::store::MediaInfo;

const RESOLUTIONS: &[(&str, &str)] = &[
    ("480p", "480p"),
    ("576p", "576p"),
    ("720p", "720p"),
    ("1080p", "1080p"),
    ("1080i", "1080i"),
    ("2160p", "2160p"),
    ("4k", "2160p"),
    ("uhd", "2160p"),
];

const VIDEO_CODECS: &[(&str, &str)] = &[
    ("x264", "x264"),
    ("h264", "H.264"),
    ("avc", "H.264"),
    ("x265", "x265"),
    ("h265", "H.265"),
    ("hevc", "HEVC"),
    ("xvid", "XviD"),
    ("divx", "DivX"),
    ("av1", "AV1"),
];

const AUDIO_CODECS: &[(&str, &str)] = &[
    ("aac", "AAC"),
    ("aac2", "AAC"),
    ("ac3", "AC3"),
    ("eac3", "EAC3"),
    ("ddp", "DD+"),
    ("ddp5", "DD+"),
    ("dd5", "DD"),
    ("dts", "DTS"),
    ("truehd", "TrueHD"),
    ("atmos", "Atmos"),
    ("flac", "FLAC"),
    ("mp3", "MP3"),
];

const SOURCES: &[(&str, &str)] = &[
    ("bluray", "BluRay"),
    ("bdrip", "BDRip"),
    ("brrip", "BRRip"),
    ("remux", "Remux"),
    ("webdl", "WEB-DL"),
    ("webrip", "WEBRip"),
    ("web", "WEB"),
    ("hdrip", "HDRip"),
    ("hdtv", "HDTV"),
    ("dvdrip", "DVDRip"),
    ("dvdscr", "DVDScr"),
    ("hdts", "HDTS"),
    ("hdtc", "HDTC"),
    ("camrip", "CAM"),
    ("cam", "CAM"),
];

const LANGUAGES: &[(&str, &str)] = &[
    ("hindi", "Hindi"),
    ("tamil", "Tamil"),
    ("telugu", "Telugu"),
    ("english", "English"),
    ("eng", "English"),
    ("ita", "Italian"),
    ("italian", "Italian"),
    ("french", "French"),
    ("spanish", "Spanish"),
    ("german", "German"),
    ("russian", "Russian"),
    ("multi", "Multi"),
    ("dual", "Dual"),
];

const SUBTITLES: &[(&str, &str)] = &[
    ("esub", "ESub"),
    ("esubs", "ESub"),
    ("msub", "MSub"),
    ("msubs", "MSub"),
    ("subs", "Subs"),
    ("hardsub", "Hardsub"),
    ("softsub", "Softsub"),
];

/// Derive media details from a release name.
pub fn parse_media(name: &str) -> MediaInfo {
    let tokens: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut media = MediaInfo::default();
    for (ix, token) in tokens.iter().enumerate() {
        // "WEB-DL" and "H.264" are split by the tokenizer
        let joined = tokens.get(ix + 1).map(|next| format!("{}{}", token, next));
        let lookup = |table: &[(&str, &'static str)]| {
            joined
                .as_deref()
                .and_then(|j| find(table, j))
                .or_else(|| find(table, token))
        };

        fill(&mut media.resolution, lookup(RESOLUTIONS));
        fill(&mut media.video_codec, lookup(VIDEO_CODECS));
        fill(&mut media.audio_codec, lookup(AUDIO_CODECS));
        fill(&mut media.source, lookup(SOURCES));
        fill(&mut media.language, lookup(LANGUAGES));
        fill(&mut media.subtitle, lookup(SUBTITLES));

        if ix > 0 && token.len() == 4 {
            if let Ok(year) = token.parse::<i32>() {
                if (1990..=2030).contains(&year) {
                    media.year = Some(year);
                }
            }
        }
    }

    media
}

fn find(table: &[(&str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == token)
        .map(|(_, value)| *value)
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = value.map(str::to_string);
    }
}
