use crate::collections::PriorityQueue;
use crate::config::Config;
use crate::currency::FxTable;
use crate::error::Result;
use crate::event::{Event, EventKind, Payload};
use crate::exchange::ExchangeRouter;
use crate::logging::{format_event_record, format_portfolio_record, format_strategy_record, StringLogUnit};
use crate::market::SliceMode;
use crate::portfolio::PortfolioRouter;
use crate::strategy::StrategyRouter;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// A dispatch handler: given the dispatcher and the event it is dispatching,
/// returns the events it produced (to be enqueued by the caller). Stored as
/// a plain `fn` pointer rather than a boxed closure so registration can
/// dedup by identity (fn pointers implement [`PartialEq`] over their
/// address) without needing `dyn`-safety machinery.
pub type Handler = fn(&mut Dispatcher, &Event) -> Result<Vec<Event>>;

/// Owns the shared event queue, the kind-keyed handler table, and the three
/// routers (exchange, portfolio, strategy) the default handlers dispatch
/// into. One dispatcher runs an entire backtest.
pub struct Dispatcher {
    queue: PriorityQueue<Event>,
    handlers: HashMap<EventKind, Vec<Handler>>,
    filtered_logging: HashSet<EventKind>,
    index: u64,
    config: Config,
    fx: FxTable,
    pub exchange: ExchangeRouter,
    pub portfolio: PortfolioRouter,
    pub strategy: StrategyRouter,
    event_log: StringLogUnit,
    portfolio_log: StringLogUnit,
    strategy_log: StringLogUnit,
}

impl Dispatcher {
    pub fn new(config: Config, fx: FxTable, slice_mode: SliceMode) -> Self {
        let mut handlers: HashMap<EventKind, Vec<Handler>> = HashMap::new();
        handlers.insert(EventKind::Default, vec![default_handler]);
        handlers.insert(EventKind::End, vec![end_handler]);
        handlers.insert(EventKind::Bar, vec![bar_handler]);
        handlers.insert(EventKind::Price, vec![price_handler]);
        handlers.insert(EventKind::Order, vec![order_handler]);
        handlers.insert(EventKind::Cancel, vec![cancel_handler]);
        handlers.insert(EventKind::Fill, vec![fill_handler]);
        handlers.insert(EventKind::Signal, vec![signal_handler]);
        handlers.insert(EventKind::Clear, vec![clear_handler]);

        let exchange = ExchangeRouter::new(&config, slice_mode);
        let portfolio = PortfolioRouter::new(&config);
        let strategy = StrategyRouter::new();

        Self {
            queue: PriorityQueue::new(),
            handlers,
            filtered_logging: HashSet::from([EventKind::Price]),
            index: 0,
            config,
            fx,
            exchange,
            portfolio,
            strategy,
            event_log: StringLogUnit::new("event"),
            portfolio_log: StringLogUnit::new("cash,amount,asset,debt,net_asset,share,net_price"),
            strategy_log: StringLogUnit::new("crt_price,short_ma,long_ma,crt_direction"),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Appends `handler` to `kind`'s handler list unless an identical fn
    /// pointer is already registered there.
    pub fn register(&mut self, kind: EventKind, handler: Handler) {
        let handlers = self.handlers.entry(kind).or_default();
        if !handlers.contains(&handler) {
            handlers.push(handler);
        }
    }

    pub fn put(&mut self, event: Event) -> Result<()> {
        self.queue.put(event)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pops one event, logs it (unless its kind is filtered), and invokes
    /// every handler registered for its kind in order, enqueueing whatever
    /// events each one produces.
    pub fn process_next(&mut self) -> Result<()> {
        let event = self.queue.pop()?;
        self.index += 1;

        tracing::debug!(index = self.index, kind = ?event.kind, timestamp = %event.timestamp, "dispatch");

        if !self.filtered_logging.contains(&event.kind) {
            let wall_clock = Utc::now();
            self.event_log.log("queue", wall_clock, &format_event_record(&event));
        }

        if let Some(handlers) = self.handlers.get(&event.kind).cloned() {
            for handler in handlers {
                for produced in handler(self, &event)? {
                    self.queue.put(produced)?;
                }
            }
        }

        Ok(())
    }

    pub fn process_through(&mut self) -> Result<()> {
        while !self.queue.is_empty() {
            self.process_next()?;
        }
        Ok(())
    }

    /// Feeds `events` one at a time, draining the queue between each; once
    /// exhausted (or if `events` is `None`), posts a single `Default` event
    /// and drains the queue one last time. The `Default` handler is
    /// responsible for posting the final `End` event.
    pub fn run<I: IntoIterator<Item = Event>>(&mut self, events: Option<I>) -> Result<()> {
        if let Some(events) = events {
            for event in events {
                self.queue.put(event)?;
                self.process_through()?;
            }
        }

        self.queue.put(Event::default_at(self.config.end_time))?;
        self.process_through()
    }

    /// Processes events while the queue is non-empty and the next event's
    /// timestamp does not exceed `t`.
    pub fn run_until(&mut self, t: DateTime<Utc>) -> Result<()> {
        while !self.queue.is_empty() && self.queue.peek()?.timestamp <= t {
            self.process_next()?;
        }
        Ok(())
    }

    /// Flushes every configured logger unit to its configured path. A
    /// logger whose path was never configured is silently skipped.
    pub fn flush_logs(&self) -> std::io::Result<()> {
        if let Ok(path) = self.config.get_path("default") {
            self.event_log.write_to(path)?;
        }
        if let Ok(path) = self.config.get_path("portfolio") {
            self.portfolio_log.write_to(path)?;
        }
        if let Ok(path) = self.config.get_path("strategy") {
            self.strategy_log.write_to(path)?;
        }
        Ok(())
    }
}

fn payload_of(event: &Event) -> Payload {
    event.payload
}

fn default_handler(d: &mut Dispatcher, _event: &Event) -> Result<Vec<Event>> {
    Ok(vec![Event::end_at(d.config.end_time)])
}

fn end_handler(d: &mut Dispatcher, _event: &Event) -> Result<Vec<Event>> {
    let mut events = vec![d.exchange.on_end()];
    events.extend(d.strategy.on_end());
    Ok(events)
}

fn bar_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Bar(bar) = payload_of(event) else {
        unreachable!("Bar event always carries a Bar payload")
    };
    let mut events = d.exchange.on_bar(&bar);
    events.extend(d.strategy.on_bar(&bar));
    Ok(events)
}

fn price_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Price(price) = payload_of(event) else {
        unreachable!("Price event always carries a Price payload")
    };
    let mut events = d.exchange.on_price(&price, d.config.tick_offset_seconds)?;
    d.portfolio.on_price(&d.fx, &price)?;
    events.extend(d.strategy.on_price(&price));
    Ok(events)
}

fn order_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Order(order) = payload_of(event) else {
        unreachable!("Order event always carries an Order payload")
    };
    d.exchange.on_order(order, d.config.tick_offset_seconds)
}

fn cancel_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Cancel(cancel) = payload_of(event) else {
        unreachable!("Cancel event always carries a Cancel payload")
    };
    d.exchange.on_cancel(&cancel)?;
    Ok(Vec::new())
}

fn fill_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Fill(fill) = payload_of(event) else {
        unreachable!("Fill event always carries a Fill payload")
    };
    let mut events = d.portfolio.on_fill(&d.fx, &d.config, &fill)?;
    events.extend(d.strategy.on_fill(&d.config, &fill));
    Ok(events)
}

fn signal_handler(d: &mut Dispatcher, event: &Event) -> Result<Vec<Event>> {
    let Payload::Signal(signal) = payload_of(event) else {
        unreachable!("Signal event always carries a Signal payload")
    };
    d.portfolio.on_signal(&d.fx, &d.config, signal)
}

fn clear_handler(d: &mut Dispatcher, _event: &Event) -> Result<Vec<Event>> {
    d.exchange.on_clear();
    let mut events = d.portfolio.on_clear(&d.fx, &d.config)?;
    events.extend(d.strategy.on_clear());

    let wall_clock = Utc::now();
    d.portfolio_log.log("portfolio", wall_clock, &format_portfolio_record(&d.portfolio.info()));
    for (symbol, info) in d.strategy.info_rows() {
        d.strategy_log.log(symbol, wall_clock, &format_strategy_record(&info));
    }

    Ok(events)
}
