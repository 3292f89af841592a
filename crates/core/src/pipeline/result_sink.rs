use crossbeam_channel::Sender;

/// Terminal outcome of one identification loop run.
///
/// Exactly one of these reaches the sink per loop instance.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// A person was identified with the given confidence; `age` is the
    /// matched face's requested attribute when the service computed it.
    Matched {
        name: String,
        age: Option<f64>,
        confidence: f64,
    },
    /// The loop aborted on a capture or service fault. `code` carries
    /// the service's HTTP status when the fault came from the remote
    /// pipeline, `None` for capture faults.
    Failed { code: Option<u16>, message: String },
    /// Teardown was requested or the stream went inactive before a
    /// match was found.
    Cancelled,
}

/// Consumer of the loop's terminal outcome — typically whatever drives
/// the surrounding UI. Delivery happens exactly once, after the loop has
/// stopped scheduling work.
pub trait ResultSink: Send {
    fn deliver(&mut self, outcome: LoopOutcome);
}

/// Forwards the outcome over a crossbeam channel, for hosts that run the
/// loop on a worker thread and consume events elsewhere.
///
/// A disconnected receiver is ignored: the host tore down first and no
/// longer cares.
pub struct ChannelResultSink {
    tx: Sender<LoopOutcome>,
}

impl ChannelResultSink {
    pub fn new(tx: Sender<LoopOutcome>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelResultSink {
    fn deliver(&mut self, outcome: LoopOutcome) {
        let _ = self.tx.send(outcome);
    }
}

/// Writes the outcome to the log, for CLI hosts with no event loop.
pub struct LogResultSink;

impl ResultSink for LogResultSink {
    fn deliver(&mut self, outcome: LoopOutcome) {
        match outcome {
            LoopOutcome::Matched {
                name,
                age,
                confidence,
            } => match age {
                Some(age) => {
                    log::info!("matched {name} (age {age:.0}) with confidence {confidence:.3}")
                }
                None => log::info!("matched {name} with confidence {confidence:.3}"),
            },
            LoopOutcome::Failed { code, message } => match code {
                Some(code) => log::error!("identification failed ({code}): {message}"),
                None => log::error!("identification failed: {message}"),
            },
            LoopOutcome::Cancelled => log::info!("identification cancelled"),
        }
    }
}
