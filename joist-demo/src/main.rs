use std::collections::HashMap;
use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use joist::prelude::*;
use joist::render::{self, RenderReceiver};
use simplelog::{Config, LevelFilter, WriteLogger};

/// Animation driver that plays every transition on a tokio timer.
struct SimulatedDriver {
    duration: Duration,
    sinks: Mutex<HashMap<ElementHandle, TransitionSink>>,
}

impl SimulatedDriver {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            sinks: Mutex::new(HashMap::new()),
        }
    }

    fn sink(&self, handle: &ElementHandle) -> Result<TransitionSink, DriverError> {
        self.sinks
            .lock()
            .map_err(|_| DriverError::Failed("sink table poisoned".to_string()))?
            .get(handle)
            .cloned()
            .ok_or(DriverError::Disconnected)
    }

    fn finish_later(&self, done: impl FnOnce() + Send + 'static) {
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            done();
        });
    }
}

#[async_trait]
impl AnimationDriver for SimulatedDriver {
    async fn initialize(
        &self,
        handle: ElementHandle,
        sink: TransitionSink,
        initially_open: bool,
        css_var_prefix: &str,
    ) -> Result<(), DriverError> {
        log::info!(
            "init {} (--{}-height, open: {})",
            handle,
            css_var_prefix,
            initially_open
        );
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.insert(handle, sink);
        }
        Ok(())
    }

    async fn open(&self, handle: ElementHandle, immediate: bool) -> Result<(), DriverError> {
        let sink = self.sink(&handle)?;
        if immediate {
            sink.on_open_complete();
        } else {
            self.finish_later(move || sink.on_open_complete());
        }
        Ok(())
    }

    async fn close(&self, handle: ElementHandle) -> Result<(), DriverError> {
        let sink = self.sink(&handle)?;
        self.finish_later(move || sink.on_close_complete());
        Ok(())
    }

    async fn dispose(&self, handle: ElementHandle) -> Result<(), DriverError> {
        log::info!("dispose {}", handle);
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.remove(&handle);
        }
        Ok(())
    }
}

/// Host side of a render: mount elements for visible panels, then flush
/// driver work.
async fn render_pass(panels: &[&PanelLifecycle]) -> Result<(), DriverError> {
    for panel in panels {
        match (panel.is_mounted(), panel.handle()) {
            (true, None) => panel.attach(ElementHandle::new()),
            (false, Some(_)) => panel.detach(),
            _ => {}
        }
    }
    sync_all(panels.iter().copied()).await
}

/// Render until no request arrives for a while.
async fn settle(
    receiver: &mut RenderReceiver,
    panels: &[&PanelLifecycle],
    describe: impl Fn() -> String,
) -> Result<(), DriverError> {
    render_pass(panels).await?;
    println!("  {}", describe());
    while let Ok(pass) = tokio::time::timeout(Duration::from_millis(400), receiver.recv()).await {
        let moved = pass.of_kind(SourceKind::Panel).count();
        log::debug!("render pass: {} dirty sources, {} panels", pass.len(), moved);
        render_pass(panels).await?;
        println!("  {}", describe());
    }
    Ok(())
}

fn log_level() -> LevelFilter {
    std::env::var("JOIST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

#[tokio::main]
async fn main() {
    let log_file = File::create("joist-demo.log").expect("Failed to create log file");
    WriteLogger::init(log_level(), Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}

async fn run() -> Result<(), DriverError> {
    let driver: Arc<dyn AnimationDriver> = Arc::new(SimulatedDriver::new(Duration::from_millis(150)));
    let (sender, mut receiver) = render::channel();

    let accordion = Accordion::new(AccordionConfig::new(), None, vec!["intro"], Arc::clone(&driver));
    accordion.install_render(sender.clone());
    accordion.on_value_change(|current, request| {
        println!("value change {:?} -> {:?} ({:?})", current, request.proposed(), request.reason());
        if request.proposed().contains(&"locked") {
            request.cancel();
        }
    });

    let items = [
        accordion.item(Some("intro"), 0u32),
        accordion.item(Some("usage"), 1u32),
        accordion.item(Some("locked"), 2u32),
    ];
    let items: Vec<AccordionItem<&str>> = items
        .into_iter()
        .collect::<Result<_, ConfigError>>()
        .map_err(|e| DriverError::Failed(e.to_string()))?;
    for item in &items {
        item.panel().install_render(sender.clone());
    }
    let panels: Vec<&PanelLifecycle> = items.iter().map(|item| item.panel()).collect();
    let describe = || {
        items
            .iter()
            .map(|item| format!("{}={:?}", item.value(), item.panel().phase()))
            .collect::<Vec<_>>()
            .join(" ")
    };

    println!("accordion: initial render");
    settle(&mut receiver, &panels, describe).await?;

    println!("accordion: press 'usage'");
    items[1].press();
    settle(&mut receiver, &panels, describe).await?;

    println!("accordion: press 'locked' (canceled by listener)");
    items[2].press();
    settle(&mut receiver, &panels, describe).await?;

    println!("accordion: ArrowUp then Enter on the focused trigger");
    items[1].handle_key(Key::ArrowUp);
    if let Some(focused) = items
        .iter()
        .find(|item| accordion.focus().current() == Some(item.trigger()))
    {
        focused.handle_key(Key::Enter);
    }
    settle(&mut receiver, &panels, describe).await?;

    let collapsible = Collapsible::new(
        CollapsibleConfig::new().hidden_until_found(true),
        None,
        false,
        Arc::clone(&driver),
    );
    collapsible.install_render(sender);
    let panels = [collapsible.panel()];
    let describe = || format!("{:?}", collapsible.snapshot());

    println!("collapsible: initial render");
    settle(&mut receiver, &panels, describe).await?;

    println!("collapsible: find-in-page match");
    collapsible.reveal();
    settle(&mut receiver, &panels, describe).await?;

    println!("collapsible: press");
    collapsible.press();
    settle(&mut receiver, &panels, describe).await?;

    for item in items {
        item.unmount().await?;
    }
    collapsible.unmount().await
}
