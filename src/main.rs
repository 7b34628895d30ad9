use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode};
use tokio::sync::{mpsc, watch};

use swap_screener::classify::SignalClassifier;
use swap_screener::config::{Config, FeedTransport};
use swap_screener::engine::{EngineConfig, IndicatorEngine};
use swap_screener::event::AppEvent;
use swap_screener::feed::rest::OkxRestClient;
use swap_screener::feed::ws::OkxWsClient;
use swap_screener::input::{parse_main_command, UiCommand};
use swap_screener::model::tick::Tick;
use swap_screener::publish::SnapshotPublisher;
use swap_screener::ui::{self, AppState};

fn now_wall_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists and is valid");
            std::process::exit(1);
        }
    };

    // Log to file so tracing output doesn't interfere with the TUI
    let log_file = std::fs::File::create("swap-screener.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        rest_url = %config.feed.rest_base_url,
        ws_url = %config.feed.ws_url,
        transport = ?config.feed.transport,
        "Starting swap-screener"
    );

    let horizon_ms = config.screener.retention_horizon_ms()?;
    let eval_interval_ms = config.screener.eval_interval_ms()?;
    let engine_cfg = EngineConfig {
        lookbacks_ms: config.screener.lookbacks_ms()?,
        signal_lookback_ms: config.screener.signal_lookback_ms()?,
        ema_span: config.screener.ema_span,
        volume_ma_span_ms: config.screener.volume_ma_span_ms()?,
        spike_threshold: config.screener.spike_threshold,
        candle_interval_ms: config.screener.candle_interval_ms()?,
    };
    let stale_after_ms = swap_screener::config::parse_duration_ms(&config.ui.stale_after)?;

    // Channels
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (tick_tx, mut tick_rx) = mpsc::channel::<Tick>(1024);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (sort_tx, sort_rx) = watch::channel(config.screener.sort_key);

    // Feed task
    match config.feed.transport {
        FeedTransport::Poll => {
            let client = OkxRestClient::new(
                &config.feed.rest_base_url,
                Duration::from_millis(config.feed.request_timeout_ms()?),
            )
            .context("failed to build REST client")?;
            let poll_interval = Duration::from_millis(config.feed.poll_interval_ms()?);
            let quote_filter = config.feed.quote_filter.clone();
            let feed_tick_tx = tick_tx.clone();
            let feed_app_tx = app_tx.clone();
            let feed_shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                client
                    .run_poll_loop(
                        poll_interval,
                        &quote_filter,
                        feed_tick_tx,
                        feed_app_tx,
                        feed_shutdown,
                    )
                    .await;
            });
        }
        FeedTransport::Websocket => {
            let client = OkxWsClient::new(
                &config.feed.ws_url,
                config.feed.tracked_instruments(),
                &config.feed.quote_filter,
            );
            let feed_tick_tx = tick_tx.clone();
            let feed_app_tx = app_tx.clone();
            let feed_shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                if let Err(e) = client
                    .connect_and_run(feed_tick_tx, feed_app_tx.clone(), feed_shutdown)
                    .await
                {
                    tracing::error!(error = %e, "WebSocket feed task failed");
                    let _ = feed_app_tx
                        .send(AppEvent::Error(format!("Feed task failed: {}", e)))
                        .await;
                }
            });
        }
    }
    drop(tick_tx);

    // Evaluation task: owns the window store, engine, classifier, publisher.
    // Ingest and evaluation are serialized through one select loop, so the
    // store is never read mid-update.
    let eval_app_tx = app_tx.clone();
    let mut eval_shutdown = shutdown_rx.clone();
    let classifier = SignalClassifier::new(
        config.screener.price_threshold_pct,
        config.screener.volume_threshold_pct,
    );
    let mut publisher = SnapshotPublisher::new(
        config.screener.sort_key,
        config.screener.min_volume,
        config.screener.max_volume,
    );
    tokio::spawn(async move {
        let mut engine = IndicatorEngine::new(engine_cfg, horizon_ms);
        let mut eval_timer =
            tokio::time::interval(Duration::from_millis(eval_interval_ms.max(1)));
        eval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                maybe_tick = tick_rx.recv() => {
                    match maybe_tick {
                        Some(tick) => {
                            engine.absorb(tick);
                        }
                        None => break,
                    }
                }
                _ = eval_timer.tick() => {
                    if engine.store().symbol_count() == 0 {
                        continue;
                    }
                    let now_ms = now_wall_ms();
                    publisher.set_sort_key(*sort_rx.borrow());
                    let mut rows = engine.evaluate(now_ms);
                    classifier.apply(&mut rows);
                    let snapshot = publisher.publish(rows, now_ms);
                    let _ = eval_app_tx.send(AppEvent::Snapshot(snapshot)).await;
                }
                _ = eval_shutdown.changed() => break,
            }
        }
        tracing::info!("Evaluation task stopped");
    });

    // TUI loop
    let mut terminal = ratatui::init();
    let mut app_state = AppState::new(config.screener.sort_key, stale_after_ms);
    app_state.push_log("swap-screener started".to_string());

    loop {
        let now = now_wall_ms();
        terminal.draw(|frame| ui::render(frame, &app_state, now))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                    tracing::info!("User quit");
                    let _ = shutdown_tx.send(true);
                    break;
                }
                if let Some(cmd) = parse_main_command(&key.code) {
                    match cmd {
                        UiCommand::Pause => {
                            if !app_state.paused {
                                app_state.paused = true;
                                app_state.push_log("Display paused".to_string());
                            }
                        }
                        UiCommand::Resume => {
                            if app_state.paused {
                                app_state.paused = false;
                                app_state.push_log("Display resumed".to_string());
                            }
                        }
                        UiCommand::CycleSort => {
                            app_state.sort_key = app_state.sort_key.next();
                            let _ = sort_tx.send(app_state.sort_key);
                            app_state
                                .push_log(format!("Sort key: {}", app_state.sort_key.as_str()));
                        }
                        UiCommand::ScrollUp => app_state.scroll_up(1),
                        UiCommand::ScrollDown => app_state.scroll_down(1),
                        UiCommand::PageUp => app_state.scroll_up(10),
                        UiCommand::PageDown => app_state.scroll_down(10),
                    }
                }
            }
        }

        // Drain events from the background tasks
        let now = now_wall_ms();
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt, now);
        }

        if *shutdown_rx.borrow() {
            break;
        }
    }

    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check swap-screener.log for details.");
    Ok(())
}
