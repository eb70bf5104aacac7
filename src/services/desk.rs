use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as ScreenLock;

use crate::services::bookings::BookingsScreen;
use crate::services::kyc_review::KycReview;
use crate::services::monitor::MonitorScreen;
use crate::services::tickets::{SendSlot, TicketsScreen};
use crate::services::tracking::TrackingScreen;
use crate::services::transactions::TransactionsScreen;

/// One admin's screens. Each screen runs one operation at a time.
pub struct Desk {
    pub transactions: ScreenLock<TransactionsScreen>,
    pub bookings: ScreenLock<BookingsScreen>,
    pub tickets: ScreenLock<TicketsScreen>,
    pub ticket_send: SendSlot,
    pub tracking: ScreenLock<TrackingScreen>,
    pub monitor: ScreenLock<MonitorScreen>,
    pub kyc: KycReview,
}

impl Desk {
    pub fn new(kyc_timeout: Duration) -> Self {
        Desk {
            transactions: ScreenLock::new(TransactionsScreen::default()),
            bookings: ScreenLock::new(BookingsScreen::default()),
            tickets: ScreenLock::new(TicketsScreen::default()),
            ticket_send: SendSlot::default(),
            tracking: ScreenLock::new(TrackingScreen::default()),
            monitor: ScreenLock::new(MonitorScreen::default()),
            kyc: KycReview::new(kyc_timeout),
        }
    }
}

/// Desks keyed by admin id, created on first use.
pub struct Desks {
    desks: Mutex<HashMap<String, Arc<Desk>>>,
    kyc_timeout: Duration,
}

impl Desks {
    pub fn new(kyc_timeout: Duration) -> Self {
        Desks {
            desks: Mutex::new(HashMap::new()),
            kyc_timeout,
        }
    }

    pub fn open(&self, admin_id: &str) -> Arc<Desk> {
        let mut desks = self.desks.lock().unwrap_or_else(PoisonError::into_inner);
        desks
            .entry(admin_id.to_string())
            .or_insert_with(|| Arc::new(Desk::new(self.kyc_timeout)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.desks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
