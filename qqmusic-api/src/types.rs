//! Data types for singer queries.
//!
//! Response objects are parsed leniently out of `serde_json::Value`: missing
//! fields fall back to zero/empty rather than failing the whole call, the
//! same way the server itself omits fields it has no value for.

use serde::Serialize;
use serde_json::Value;

/// Singer region filter, mapped to the `area` parameter.
///
/// | Variant   | API value |
/// |-----------|-----------|
/// | `All`     | -100      |
/// | `China`   | 200       |
/// | `Taiwan`  | 2         |
/// | `America` | 5         |
/// | `Europe`  | 4         |
/// | `Japan`   | 3         |
/// | `Korea`   | 1         |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AreaType {
    #[default]
    All = -100,
    China = 200,
    Taiwan = 2,
    America = 5,
    Europe = 4,
    Japan = 3,
    Korea = 1,
}

/// Music genre filter, mapped to the `genre` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenreType {
    #[default]
    All = -100,
    Pop = 7,
    Rap = 3,
    ChineseStyle = 19,
    Rock = 4,
    Electronic = 2,
    Folk = 8,
    RnB = 11,
    Ethnic = 37,
    LightMusic = 93,
    Jazz = 14,
    Classical = 33,
    Country = 13,
    Blues = 10,
}

/// Singer gender filter, mapped to the `sex` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SexType {
    #[default]
    All = -100,
    Male = 0,
    Female = 1,
    Group = 2,
}

/// Singer homepage tab.
///
/// Each tab is identified on the wire by a `TabID`; the response carries
/// the tab content under a field named after the tab kind.
///
/// | Variant    | `TabID`          | Response field    |
/// |------------|------------------|-------------------|
/// | `Wiki`     | `wiki`           | `IntroductionTab` |
/// | `Album`    | `album`          | `AlbumTab`        |
/// | `Composer` | `song_composing` | `SongTab`         |
/// | `Lyricist` | `song_lyric`     | `SongTab`         |
/// | `Producer` | `producer`       | `SongTab`         |
/// | `Arranger` | `arranger`       | `SongTab`         |
/// | `Musician` | `musician`       | `SongTab`         |
/// | `Song`     | `song_sing`      | `SongTab`         |
/// | `Video`    | `video`          | `VideoTab`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabType {
    Wiki,
    Album,
    Composer,
    Lyricist,
    Producer,
    Arranger,
    Musician,
    Song,
    Video,
}

impl TabType {
    pub fn tab_id(self) -> &'static str {
        match self {
            Self::Wiki => "wiki",
            Self::Album => "album",
            Self::Composer => "song_composing",
            Self::Lyricist => "song_lyric",
            Self::Producer => "producer",
            Self::Arranger => "arranger",
            Self::Musician => "musician",
            Self::Song => "song_sing",
            Self::Video => "video",
        }
    }

    pub fn tab_name(self) -> &'static str {
        match self {
            Self::Wiki => "IntroductionTab",
            Self::Album => "AlbumTab",
            Self::Video => "VideoTab",
            _ => "SongTab",
        }
    }

    /// Whether the tab lists songs.
    pub fn is_song_tab(self) -> bool {
        self.tab_name() == "SongTab"
    }
}

/// Entry of the hot singer list.
#[derive(Debug, Clone, Serialize)]
pub struct SingerBrief {
    pub id: u64,
    pub mid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic_url: Option<String>,
}

impl SingerBrief {
    pub(crate) fn from_value(v: &Value) -> Self {
        Self {
            id: v["singer_id"].as_u64().unwrap_or(0),
            mid: v["singer_mid"].as_str().unwrap_or("").to_owned(),
            name: v["singer_name"].as_str().unwrap_or("").to_owned(),
            pic_url: v["singer_pic"].as_str().map(String::from),
        }
    }
}

/// Singer homepage header.
///
/// API JSON path: `Info.Singer` merged with `Info.FansNum.Num`.
#[derive(Debug, Clone, Serialize)]
pub struct SingerInfo {
    pub mid: String,
    pub name: String,
    pub fans_num: u64,
    /// The complete `Info.Singer` object.
    pub raw: Value,
}

impl SingerInfo {
    pub(crate) fn from_value(info: &Value) -> Self {
        let singer = &info["Singer"];
        Self {
            mid: singer["SingerMid"].as_str().unwrap_or("").to_owned(),
            name: singer["Name"].as_str().unwrap_or("").to_owned(),
            fans_num: info["FansNum"]["Num"].as_u64().unwrap_or(0),
            raw: singer.clone(),
        }
    }
}

/// Song as listed in a singer's song tabs.
///
/// Items come either flat or wrapped in `songInfo`; both are accepted.
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub id: u64,
    pub mid: String,
    pub name: String,
    pub singers: Vec<String>,
}

impl Song {
    pub(crate) fn from_value(v: &Value) -> Self {
        let s = if v["songInfo"].is_object() { &v["songInfo"] } else { v };
        let singers = s["singer"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|a| a["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: s["id"].as_u64().unwrap_or(0),
            mid: s["mid"].as_str().unwrap_or("").to_owned(),
            name: s["name"]
                .as_str()
                .or_else(|| s["title"].as_str())
                .unwrap_or("")
                .to_owned(),
            singers,
        }
    }

    pub(crate) fn from_list(list: &Value) -> Vec<Self> {
        list.as_array()
            .map(|arr| arr.iter().map(Self::from_value).collect())
            .unwrap_or_default()
    }
}
