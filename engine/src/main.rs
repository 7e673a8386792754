// Engine main entry point
use anyhow::{bail, Context};
use chrono::DateTime;
use engine::aggregation::AggregationGate;
use engine::config::settings::EngineSettings;
use engine::data::{CandleCsvParser, MarketDataStore};
use engine::playback::PlaybackSession;
use shared::models::TimeFrame;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: replay-engine <candles.csv> [target-timeframe] [cursor]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(csv_path) = args.first() else {
        bail!(USAGE);
    };
    let target = match args.get(1) {
        Some(label) => TimeFrame::from_label(label).with_context(|| format!("unknown timeframe '{}'", label))?,
        None => TimeFrame::Hour1,
    };
    let cursor = args
        .get(2)
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("cursor must be a non-negative integer")?;

    let settings = match std::env::var("REPLAY_ENGINE_CONFIG") {
        Ok(path) => EngineSettings::load_from_path(&path)?,
        Err(_) => EngineSettings::load_default()?,
    };

    info!("Starting replay engine...");
    let candles = CandleCsvParser::new().load_candles_from_csv(csv_path)?;
    let base = detect_timeframe(&candles).context("cannot infer the base timeframe of the CSV")?;
    info!(%base, count = candles.len(), "Base series loaded");

    let mut store = MarketDataStore::new();
    store.add_candles(csv_path, base, candles)?;
    let base_candles = store
        .dataset(csv_path)
        .map(|d| d.candles.clone())
        .unwrap_or_default();

    let gate = AggregationGate::new();
    let bars = store
        .candles_streamed(csv_path, target, settings.aggregation.chunk_size, &gate, |done, total| {
            info!(done, total, "Aggregating");
        })
        .await?
        .unwrap_or_default();
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        info!(%target, bars = bars.len(), from = first.time, to = last.time, "Aggregation finished");
    }

    let mut session = PlaybackSession::new(base_candles, base);
    match cursor {
        Some(index) => session.seek(index),
        None => {
            session.step_forward(usize::MAX);
        }
    }
    let replayed = session.bars(target);
    if let Some(forming) = session.forming_bar(target) {
        println!(
            "cursor={:?} time={:?} bars={} forming: t={} o={} h={} l={} c={} v={}",
            session.cursor(),
            session.current_time(),
            replayed.len(),
            format_time(forming.time),
            forming.open,
            forming.high,
            forming.low,
            forming.close,
            forming.volume_or_zero()
        );
    } else {
        println!("no bars at cursor {:?}", session.cursor());
    }
    Ok(())
}

/// Smallest known interval that divides the gaps between the first candles.
fn detect_timeframe(candles: &[shared::models::Candle]) -> anyhow::Result<TimeFrame> {
    let mut times: Vec<i64> = candles.iter().map(|c| c.time).filter(|t| *t > 0).collect();
    times.sort_unstable();
    times.dedup();
    let Some(gap) = times.windows(2).map(|w| w[1] - w[0]).take(1000).min() else {
        bail!("need at least two candles with distinct times");
    };
    TimeFrame::all()
        .iter()
        .rev()
        .find(|tf| tf.interval_secs() <= gap && gap % tf.interval_secs() == 0)
        .copied()
        .with_context(|| format!("no timeframe fits a {}s candle spacing", gap))
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
