use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use exm_data::{
    Count, Expense, ExpenseFilter, Member, MemberFilter, Observe, Query, Retrieve, StoreChange,
    Subscription, SyncReport, SyncService, SyncState, Table, Update, User,
};

use crate::{
    ChromePresenter, Clock, Color, ControllerConfig, FilterDialogs, FilterKind, FilterSelection,
    FilterState, ListPresenter, Presenters,
};

/// Storage needed by the expense list.
pub trait ExpenseStore:
    Query<Expense, Filter = ExpenseFilter>
    + Count<Member, Filter = MemberFilter>
    + Retrieve<User, Key = u32>
    + Retrieve<SyncState, Key = u32>
    + Update<SyncState>
    + Observe
{
}

impl<T> ExpenseStore for T where
    T: Query<Expense, Filter = ExpenseFilter>
        + Count<Member, Filter = MemberFilter>
        + Retrieve<User, Key = u32>
        + Retrieve<SyncState, Key = u32>
        + Update<SyncState>
        + Observe
{
}

/// Why a sync was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The data was older than the sync interval.
    Stale,
    /// The user asked for a refresh.
    Manual,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub trigger: SyncTrigger,
    pub result: Result<SyncReport>,
}

#[derive(Debug)]
pub enum ScreenEvent {
    Selection(FilterSelection),
    StoreChanged(StoreChange),
    SyncFinished(SyncOutcome),
}

pub struct ExpenseListController<S> {
    group_id: u32,
    filters: FilterState,
    last_synced_at_millis: u64,
    member_count: u32,

    store: S,
    sync: Arc<dyn SyncService>,
    dialogs: Box<dyn FilterDialogs>,
    chrome: Box<dyn ChromePresenter>,
    list: Box<dyn ListPresenter>,
    clock: Box<dyn Clock>,
    config: ControllerConfig,

    subscription: Option<Subscription>,
    selections_tx: mpsc::UnboundedSender<FilterSelection>,
    selections_rx: mpsc::UnboundedReceiver<FilterSelection>,
    sync_tx: mpsc::UnboundedSender<SyncOutcome>,
    sync_rx: mpsc::UnboundedReceiver<SyncOutcome>,
    syncs_in_flight: usize,
}

impl<S: ExpenseStore> ExpenseListController<S> {
    /// Open the expense list of a group. Nothing is drawn
    /// until the controller is resumed.
    pub async fn open(
        group_id: u32,
        store: S,
        sync: Arc<dyn SyncService>,
        presenters: Presenters,
        clock: Box<dyn Clock>,
        config: ControllerConfig,
    ) -> Result<Self> {
        let state = <S as Retrieve<SyncState>>::retrieve(&store, group_id)
            .await
            .with_context(|| format!("loading sync state of group {}", group_id))?;
        let last_synced_at_millis = u64::try_from(state.synced_at_millis).unwrap_or(0);
        debug!(group_id, last_synced_at_millis, "expense list opened");

        let (selections_tx, selections_rx) = mpsc::unbounded_channel();
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        Ok(Self {
            group_id,
            filters: FilterState::default(),
            last_synced_at_millis,
            member_count: 0,
            store,
            sync,
            dialogs: presenters.dialogs,
            chrome: presenters.chrome,
            list: presenters.list,
            clock,
            config,
            subscription: None,
            selections_tx,
            selections_rx,
            sync_tx,
            sync_rx,
            syncs_in_flight: 0,
        })
    }

    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn member_count(&self) -> u32 {
        self.member_count
    }

    pub fn last_synced_at_millis(&self) -> u64 {
        self.last_synced_at_millis
    }

    pub fn is_resumed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn syncs_in_flight(&self) -> usize {
        self.syncs_in_flight
    }

    /// Channel the filter dialogs answer on.
    pub fn selections(&self) -> mpsc::UnboundedSender<FilterSelection> {
        self.selections_tx.clone()
    }

    /// Member filtering only makes sense with two or more
    /// accepted members.
    pub fn member_filter_offered(&self) -> bool {
        self.member_count > 1
    }

    /// The screen came to the foreground: listen for store
    /// changes and redraw.
    pub async fn resume(&mut self) -> Result<()> {
        if self.subscription.is_none() {
            self.subscription = Some(self.store.subscribe());
        }
        self.recompute().await
    }

    /// The screen left the foreground: stop listening and
    /// reset the toolbar.
    pub fn pause(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.store.unsubscribe(subscription);
        }
        self.chrome.set_accent_color(self.config.default_accent);
        self.chrome.hide_user_badge();
        self.chrome.set_title(&self.config.app_label);
        debug!(group_id = self.group_id, "expense list paused");
    }

    /// Redraw the list from the store and sync if the data is stale.
    pub async fn recompute(&mut self) -> Result<()> {
        self.list.clear();

        self.member_count = self
            .store
            .count(&MemberFilter::accepted_in(self.group_id))
            .await
            .with_context(|| format!("counting accepted members of group {}", self.group_id))?;
        self.list.set_show_member_column(self.member_count > 1);

        let variant = self.filters.select_query(self.group_id);
        let expenses = self
            .store
            .query(&variant.to_filter())
            .await
            .with_context(|| format!("querying expenses of group {}", self.group_id))?;
        debug!(
            group_id = self.group_id,
            ?variant,
            expenses = expenses.len(),
            members = self.member_count,
            "expense list recomputed"
        );
        self.list.set_items(expenses);

        self.sync_if_stale().await
    }

    pub fn is_stale(&self, now_millis: u64) -> bool {
        now_millis.saturating_sub(self.last_synced_at_millis) > self.config.sync_interval_millis()
    }

    /// Start a background sync when the data is older than the sync
    /// interval. The sync time is recorded before the sync completes.
    async fn sync_if_stale(&mut self) -> Result<()> {
        let now = self.clock.now_millis();
        if !self.is_stale(now) {
            return Ok(());
        }
        if self.syncs_in_flight > 0 {
            debug!(
                group_id = self.group_id,
                in_flight = self.syncs_in_flight,
                "data stale but a sync is running"
            );
            return Ok(());
        }

        self.start_sync(SyncTrigger::Stale);
        self.last_synced_at_millis = now;
        let state = SyncState {
            group_id: self.group_id,
            synced_at_millis: i64::try_from(now).unwrap_or(i64::MAX),
        };
        self.store
            .update(state)
            .await
            .with_context(|| format!("saving sync time of group {}", self.group_id))?;
        Ok(())
    }

    /// Manual refresh: always syncs, the refresh indicator is
    /// cleared when the sync reports back.
    pub fn refresh(&mut self) {
        self.list.set_refreshing(true);
        self.start_sync(SyncTrigger::Manual);
    }

    fn start_sync(&mut self, trigger: SyncTrigger) {
        info!(group_id = self.group_id, ?trigger, "starting sync");
        self.syncs_in_flight += 1;

        let sync = Arc::clone(&self.sync);
        let tx = self.sync_tx.clone();
        let group_id = self.group_id;
        tokio::spawn(async move {
            let result = sync.sync_group_expenses(group_id).await;
            // The controller may be gone by now.
            if tx.send(SyncOutcome { trigger, result }).is_err() {
                debug!(group_id, "sync finished after the expense list closed");
            }
        });
    }

    /// Show the dialog for a filter dimension with the current state.
    /// Returns false if the dialog is not offered.
    pub fn open_filter(&mut self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Member => {
                if !self.member_filter_offered() {
                    debug!(
                        group_id = self.group_id,
                        members = self.member_count,
                        "member filter not offered"
                    );
                    return false;
                }
                self.dialogs
                    .show_member_filter(self.filters.member_active(), self.filters.member());
            }
            FilterKind::Category => {
                self.dialogs
                    .show_category_filter(self.filters.category_active(), self.filters.category());
            }
            FilterKind::Date => {
                self.dialogs.show_date_filter(self.filters.date_range());
            }
        }
        true
    }

    /// Apply what a filter dialog reported and redraw.
    pub async fn apply_selection(&mut self, selection: FilterSelection) -> Result<()> {
        match selection {
            FilterSelection::Member(member) => {
                let active = self.filters.toggle_member(member);
                debug!(group_id = self.group_id, active, "member filter toggled");
                self.update_member_badge().await?;
            }
            FilterSelection::Category(category) => {
                let active = self.filters.toggle_category(category);
                debug!(group_id = self.group_id, active, "category filter toggled");
                self.update_accent();
            }
            FilterSelection::DateRange(range) => {
                let active = self.filters.set_date_range(range);
                debug!(group_id = self.group_id, active, ?range, "date filter set");
            }
        }
        self.recompute().await
    }

    async fn update_member_badge(&mut self) -> Result<()> {
        let member = match self.filters.member() {
            Some(member) if self.filters.member_active() => Some(member.clone()),
            _ => None,
        };
        let user = match &member {
            Some(member) => member
                .get_user(&self.store)
                .await
                .with_context(|| format!("loading user of member {}", member.id))?,
            None => None,
        };
        match user {
            Some(user) => self.chrome.show_user_badge(&user.photo_url, &user.fullname),
            None => {
                self.chrome.hide_user_badge();
                self.chrome.set_title(&self.config.app_label);
            }
        }
        Ok(())
    }

    fn update_accent(&mut self) {
        let category = match self.filters.category() {
            Some(category) if self.filters.category_active() => category,
            _ => {
                self.chrome.set_accent_color(self.config.default_accent);
                return;
            }
        };
        let color = match category.color.parse::<Color>() {
            Ok(color) => color,
            Err(e) => {
                warn!(category = category.id, error = %e, "unusable category colour");
                self.config.default_accent
            }
        };
        self.chrome.set_accent_color(color);
    }

    /// Wait for the next event: a dialog selection, a finished
    /// sync or, while resumed, a store change. The controller holds
    /// the senders of both channels, so this waits until something
    /// arrives and never ends on its own.
    pub async fn next_event(&mut self) -> ScreenEvent {
        let subscription = &mut self.subscription;
        tokio::select! {
            Some(selection) = self.selections_rx.recv() => ScreenEvent::Selection(selection),
            Some(outcome) = self.sync_rx.recv() => ScreenEvent::SyncFinished(outcome),
            Some(change) = next_change(subscription) => ScreenEvent::StoreChanged(change),
        }
    }

    /// Handle everything that is already queued, without waiting.
    /// Returns the number of events handled.
    pub async fn process_pending(&mut self) -> Result<usize> {
        let mut handled = 0;
        loop {
            let event = if let Ok(selection) = self.selections_rx.try_recv() {
                ScreenEvent::Selection(selection)
            } else if let Ok(outcome) = self.sync_rx.try_recv() {
                ScreenEvent::SyncFinished(outcome)
            } else if let Some(change) = self.subscription.as_mut().and_then(|s| s.try_changed()) {
                ScreenEvent::StoreChanged(change)
            } else {
                return Ok(handled);
            };
            self.handle(event).await?;
            handled += 1;
        }
    }

    pub async fn handle(&mut self, event: ScreenEvent) -> Result<()> {
        match event {
            ScreenEvent::Selection(selection) => self.apply_selection(selection).await,
            ScreenEvent::StoreChanged(change) => self.store_changed(change).await,
            ScreenEvent::SyncFinished(outcome) => {
                self.sync_finished(outcome);
                Ok(())
            }
        }
    }

    async fn store_changed(&mut self, change: StoreChange) -> Result<()> {
        // Our own bookkeeping does not change what is shown.
        if change.table == Table::SyncState {
            return Ok(());
        }
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(());
        };
        let coalesced = subscription.drain();
        debug!(
            group_id = self.group_id,
            table = ?change.table,
            coalesced,
            "store changed"
        );
        self.recompute().await
    }

    fn sync_finished(&mut self, outcome: SyncOutcome) {
        self.syncs_in_flight = self.syncs_in_flight.saturating_sub(1);
        match &outcome.result {
            Ok(report) => info!(
                group_id = self.group_id,
                trigger = ?outcome.trigger,
                expenses = report.expenses,
                "sync finished"
            ),
            Err(e) => error!(
                group_id = self.group_id,
                trigger = ?outcome.trigger,
                error = %format!("{:#}", e),
                "sync failed"
            ),
        }
        if outcome.trigger == SyncTrigger::Manual {
            self.list.set_refreshing(false);
        }
    }
}

async fn next_change(subscription: &mut Option<Subscription>) -> Option<StoreChange> {
    match subscription {
        Some(subscription) => subscription.changed().await,
        None => std::future::pending().await,
    }
}
