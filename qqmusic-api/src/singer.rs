//! Singer list and singer homepage queries.
//!
//! # Endpoints
//!
//! ## `singer_list` — `music.musichallSinger.SingerList` / `GetSingerList`
//!
//! Param: `{ "hastag": 0, "area": -100, "sex": -100, "genre": -100 }`
//!
//! Payload: `{ "hotlist": [{ "singer_id": 4558, "singer_mid": "0025NhlN2yWrP4", "singer_name": "周杰伦", "singer_pic": "..." }] }`
//!
//! ## `Singer::info` — `music.UnifiedHomepage.UnifiedHomepageSrv` / `GetHomepageHeader`
//!
//! Param: `{ "SingerMid": "0025NhlN2yWrP4" }`
//!
//! Payload: `{ "Info": { "Singer": { "SingerMid": "...", "Name": "..." }, "FansNum": { "Num": 123 } } }`
//!
//! ## `Singer::tab_detail` — same module / `GetHomepageTabDetail`
//!
//! Param: `{ "SingerMid", "IsQueryTabDetail": 1, "TabID", "PageNum", "PageSize", "Order": 0 }`
//!
//! Payload: the tab content under its [`TabType::tab_name`] field,
//! e.g. `{ "SongTab": { "List": [...] } }`.

use crate::client::QQMusic;
use crate::envelope::RequestOptions;
use crate::error::{QQMusicError, Result};
use crate::types::{AreaType, GenreType, SexType, SingerBrief, SingerInfo, Song, TabType};
use serde_json::{Value, json};
use tokio::sync::OnceCell;

const SINGER_LIST_MODULE: &str = "music.musichallSinger.SingerList";
const HOMEPAGE_MODULE: &str = "music.UnifiedHomepage.UnifiedHomepageSrv";

impl QQMusic {
    /// Hot singers matching the given filters.
    pub async fn singer_list(
        &self,
        area: AreaType,
        sex: SexType,
        genre: GenreType,
    ) -> Result<Vec<SingerBrief>> {
        let param = json!({
            "hastag": 0,
            "area": area as i64,
            "sex": sex as i64,
            "genre": genre as i64,
        });
        let data = self
            .get_data(SINGER_LIST_MODULE, "GetSingerList", param, &RequestOptions::new())
            .await?;
        let hotlist = data["hotlist"]
            .as_array()
            .ok_or_else(|| QQMusicError::Other("missing hotlist".into()))?;
        Ok(hotlist.iter().map(SingerBrief::from_value).collect())
    }
}

/// A singer, identified by `mid`. The homepage header is fetched once and
/// cached.
#[derive(Debug)]
pub struct Singer {
    mid: String,
    info: OnceCell<SingerInfo>,
}

impl Singer {
    pub fn new(mid: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            info: OnceCell::new(),
        }
    }

    pub fn mid(&self) -> &str {
        &self.mid
    }

    /// Homepage header (name, fans count, raw singer object).
    pub async fn info(&self, api: &QQMusic) -> Result<&SingerInfo> {
        self.info
            .get_or_try_init(|| async {
                let data = api
                    .get_data(
                        HOMEPAGE_MODULE,
                        "GetHomepageHeader",
                        json!({ "SingerMid": self.mid }),
                        &RequestOptions::new(),
                    )
                    .await?;
                Ok::<_, QQMusicError>(SingerInfo::from_value(&data["Info"]))
            })
            .await
    }

    pub async fn fans_num(&self, api: &QQMusic) -> Result<u64> {
        Ok(self.info(api).await?.fans_num)
    }

    /// Raw content of a homepage tab. `page` is 1-based.
    pub async fn tab_detail(
        &self,
        api: &QQMusic,
        tab: TabType,
        page: u32,
        num: u32,
    ) -> Result<Value> {
        let param = json!({
            "SingerMid": self.mid,
            "IsQueryTabDetail": 1,
            "TabID": tab.tab_id(),
            "PageNum": page.saturating_sub(1),
            "PageSize": num,
            "Order": 0,
        });
        let mut data = api
            .get_data(HOMEPAGE_MODULE, "GetHomepageTabDetail", param, &RequestOptions::new())
            .await?;
        Ok(data
            .get_mut(tab.tab_name())
            .map(Value::take)
            .unwrap_or_default())
    }

    /// Songs of a song-like tab (`Song`, `Composer`, `Lyricist`, `Producer`,
    /// `Musician`, `Arranger`).
    pub async fn songs(&self, api: &QQMusic, tab: TabType, page: u32, num: u32) -> Result<Vec<Song>> {
        if !tab.is_song_tab() {
            return Err(QQMusicError::Other(format!("{tab:?} is not a song tab")));
        }
        let detail = self.tab_detail(api, tab, page, num).await?;
        Ok(Song::from_list(&detail["List"]))
    }
}
