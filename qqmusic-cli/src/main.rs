mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qqmusic_api::types::{AreaType, GenreType, SexType, TabType};
use qqmusic_api::{QQMusic, QQMusicBuilder, RequestOptions, Singer};
use serde_json::Value;
use session::Session;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qqmusic", version, about = "QQ Music API command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save login credential (musicid + musickey)
    Login {
        /// QQ Music account id (musicid)
        #[arg(required_unless_present = "check")]
        account_id: Option<String>,
        /// Auth token (musickey)
        #[arg(required_unless_present = "check")]
        auth_token: Option<String>,
        /// Show the saved login instead
        #[arg(long)]
        check: bool,
    },
    /// Clear saved session
    Logout,
    /// List hot singers
    Singers {
        #[arg(long, default_value = "all")]
        area: AreaArg,
        #[arg(long, default_value = "all")]
        sex: SexArg,
        #[arg(long, default_value = "all")]
        genre: GenreArg,
    },
    /// Show singer info and songs
    Singer {
        /// Singer mid
        mid: String,
        #[arg(short, long, default_value = "song")]
        tab: TabArg,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Page size
        #[arg(short, long, default_value = "20")]
        num: u32,
    },
    /// Call a raw module/method and print the payload
    Call {
        module: String,
        method: String,
        /// Request param as JSON object
        #[arg(default_value = "{}")]
        params: String,
        /// Send the saved credential
        #[arg(long)]
        need_login: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum AreaArg {
    All,
    China,
    Taiwan,
    America,
    Europe,
    Japan,
    Korea,
}

#[derive(Clone, ValueEnum)]
enum SexArg {
    All,
    Male,
    Female,
    Group,
}

#[derive(Clone, ValueEnum)]
enum GenreArg {
    All,
    Pop,
    Rap,
    ChineseStyle,
    Rock,
    Electronic,
    Folk,
    Rnb,
    Ethnic,
    LightMusic,
    Jazz,
    Classical,
    Country,
    Blues,
}

#[derive(Clone, ValueEnum)]
enum TabArg {
    Song,
    Composer,
    Lyricist,
    Producer,
    Arranger,
    Musician,
}

impl From<AreaArg> for AreaType {
    fn from(a: AreaArg) -> Self {
        match a {
            AreaArg::All => Self::All,
            AreaArg::China => Self::China,
            AreaArg::Taiwan => Self::Taiwan,
            AreaArg::America => Self::America,
            AreaArg::Europe => Self::Europe,
            AreaArg::Japan => Self::Japan,
            AreaArg::Korea => Self::Korea,
        }
    }
}

impl From<SexArg> for SexType {
    fn from(s: SexArg) -> Self {
        match s {
            SexArg::All => Self::All,
            SexArg::Male => Self::Male,
            SexArg::Female => Self::Female,
            SexArg::Group => Self::Group,
        }
    }
}

impl From<GenreArg> for GenreType {
    fn from(g: GenreArg) -> Self {
        match g {
            GenreArg::All => Self::All,
            GenreArg::Pop => Self::Pop,
            GenreArg::Rap => Self::Rap,
            GenreArg::ChineseStyle => Self::ChineseStyle,
            GenreArg::Rock => Self::Rock,
            GenreArg::Electronic => Self::Electronic,
            GenreArg::Folk => Self::Folk,
            GenreArg::Rnb => Self::RnB,
            GenreArg::Ethnic => Self::Ethnic,
            GenreArg::LightMusic => Self::LightMusic,
            GenreArg::Jazz => Self::Jazz,
            GenreArg::Classical => Self::Classical,
            GenreArg::Country => Self::Country,
            GenreArg::Blues => Self::Blues,
        }
    }
}

impl From<TabArg> for TabType {
    fn from(t: TabArg) -> Self {
        match t {
            TabArg::Song => Self::Song,
            TabArg::Composer => Self::Composer,
            TabArg::Lyricist => Self::Lyricist,
            TabArg::Producer => Self::Producer,
            TabArg::Arranger => Self::Arranger,
            TabArg::Musician => Self::Musician,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Login {
            account_id,
            auth_token,
            check,
        } => cmd_login(account_id, auth_token, check),
        Command::Logout => cmd_logout(),
        Command::Singers { area, sex, genre } => {
            cmd_singers(area.into(), sex.into(), genre.into()).await
        }
        Command::Singer {
            mid,
            tab,
            page,
            num,
        } => cmd_singer(mid, tab.into(), page, num).await,
        Command::Call {
            module,
            method,
            params,
            need_login,
        } => cmd_call(&module, &method, &params, need_login).await,
    }
}

/// Install the global instance with the saved credential.
fn api() -> Result<&'static QQMusic> {
    let credential = Session::load()?.credential()?;
    Ok(QQMusic::init_global(
        QQMusicBuilder::default().credential(credential).build(),
    ))
}

// ── login / logout ──

fn cmd_login(account_id: Option<String>, auth_token: Option<String>, check: bool) -> Result<()> {
    if check {
        let session = Session::load()?;
        if session.musicid.is_empty() {
            println!("Not logged in.");
        } else {
            let kind = qqmusic_api::LoginType::classify(&session.musickey);
            println!("Logged in as {} ({kind:?} login)", session.musicid);
        }
        return Ok(());
    }

    let session = Session {
        musicid: account_id.context("account id required")?,
        musickey: auth_token.context("auth token required")?,
    };
    session.credential()?;
    session.save()?;
    println!("Session saved.");
    Ok(())
}

fn cmd_logout() -> Result<()> {
    Session::clear()?;
    println!("Session cleared.");
    Ok(())
}

// ── singers ──

async fn cmd_singers(area: AreaType, sex: SexType, genre: GenreType) -> Result<()> {
    let api = api()?;
    let _guard = api.shutdown_guard();
    let singers = api.singer_list(area, sex, genre).await?;
    for s in &singers {
        println!("  [{}] {}", s.mid, s.name);
    }
    Ok(())
}

async fn cmd_singer(mid: String, tab: TabType, page: u32, num: u32) -> Result<()> {
    let api = api()?;
    let _guard = api.shutdown_guard();
    let singer = Singer::new(mid);

    let info = singer.info(api).await?;
    println!("Singer: {} (mid={})", info.name, singer.mid());
    println!("Fans:   {}", info.fans_num);
    println!();

    for song in singer.songs(api, tab, page, num).await? {
        println!("  [{}] {} - {}", song.mid, song.singers.join(", "), song.name);
    }
    Ok(())
}

// ── raw call ──

async fn cmd_call(module: &str, method: &str, params: &str, need_login: bool) -> Result<()> {
    let params: Value = serde_json::from_str(params).context("params must be valid JSON")?;
    let api = api()?;
    let _guard = api.shutdown_guard();
    let data = api
        .get_data(module, method, params, &RequestOptions::new().need_login(need_login))
        .await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
