//! Background forward worker.
//!
//! Ingress enqueues reports with `try_send` and returns immediately; this
//! loop drains the queue and runs each delivery to completion or timeout,
//! independent of whether the original caller is still listening. No
//! cancellation propagates in from the ingress side.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::forwarder::upstream::{ForwardOutcome, UpstreamForwarder, UpstreamReport};

pub async fn run(forwarder: UpstreamForwarder, mut reports: mpsc::Receiver<UpstreamReport>) {
    info!("upstream forward worker started");

    while let Some(report) = reports.recv().await {
        match forwarder.forward(&report).await {
            ForwardOutcome::Delivered { endpoint, attempts } => {
                debug!(
                    serial = %report.serial_number,
                    endpoint = %endpoint,
                    attempts,
                    "location report delivered upstream"
                );
            }
            ForwardOutcome::Failed { attempts } => {
                warn!(
                    serial = %report.serial_number,
                    attempts,
                    "location report not delivered to any upstream endpoint"
                );
            }
        }
    }

    info!("upstream forward worker stopped");
}
