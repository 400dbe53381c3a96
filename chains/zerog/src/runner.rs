use crate::account::{Account, AccountTag};
use crate::trade::{ActionSelector, TradeSession};
use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;
use core_logic::{ProxyEndpoint, ProxyPool};
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};

/// Builds the trading session of one account behind its proxy.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: TradeSession;

    async fn open(&self, account: &Account, proxy: Option<ProxyEndpoint>) -> Result<Self::Session>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub processed: usize,
    pub succeeded: usize,
}

/// Walks every account once, strictly in order.
pub struct AccountRunner<F, S, R> {
    factory: F,
    proxies: ProxyPool,
    selector: S,
    rng: R,
    daily_tx_count: u32,
}

impl<F, S, R> AccountRunner<F, S, R>
where
    F: SessionFactory,
    S: ActionSelector,
    R: Rng + Send,
{
    pub fn new(factory: F, proxies: ProxyPool, selector: S, rng: R, daily_tx_count: u32) -> Self {
        Self {
            factory,
            proxies,
            selector,
            rng,
            daily_tx_count,
        }
    }

    pub async fn run_pass(&mut self, accounts: &[Account]) -> RunState {
        let total = accounts.len();
        let mut state = RunState::default();

        for (idx, account) in accounts.iter().enumerate() {
            let tag = AccountTag::new(idx, total);
            print_separator();
            let span = info_span!("account", label = %tag);
            let succeeded = self.run_account(account).instrument(span).await;

            state.processed += 1;
            if succeeded {
                state.succeeded += 1;
            }
        }

        state
    }

    async fn run_account(&mut self, account: &Account) -> bool {
        info!("Starting account {:?}", account.address());

        let proxy = self.proxies.acquire(&mut self.rng).await;
        match &proxy {
            Some(p) => info!("Using proxy {}", p),
            None => info!("Using local IP"),
        }

        let mut session = match self.factory.open(account, proxy).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to open session: {:#}", e);
                return false;
            }
        };

        let mut all_completed = true;
        for i in 1..=self.daily_tx_count {
            info!("progress {}/{}", i, self.daily_tx_count);
            let action = self.selector.next_action();
            match session.perform(&action).await {
                Ok(outcome) => {
                    if outcome.is_failed() {
                        all_completed = false;
                    }
                }
                Err(e) => {
                    error!("Account stopped: {}", e);
                    return false;
                }
            }
        }

        if all_completed {
            info!(kind = "success", "Account finished");
        } else {
            warn!("Account finished with failed actions");
        }
        all_completed
    }
}

/// Bare console rule between accounts; kept out of the log files.
fn print_separator() {
    println!("{}", "═".repeat(80).white());
}

/// Runs a pass over all accounts, then sleeps, forever.
pub struct Scheduler<F, S, R> {
    runner: AccountRunner<F, S, R>,
    accounts: Vec<Account>,
    interval: Duration,
}

impl<F, S, R> Scheduler<F, S, R>
where
    F: SessionFactory,
    S: ActionSelector,
    R: Rng + Send,
{
    pub fn new(runner: AccountRunner<F, S, R>, accounts: Vec<Account>, interval: Duration) -> Self {
        Self {
            runner,
            accounts,
            interval,
        }
    }

    pub async fn run_pass_and_report(&mut self) -> RunState {
        let state = self.runner.run_pass(&self.accounts).await;
        print_separator();
        info!(
            kind = "success",
            "Pass done: {}/{} accounts succeeded",
            state.succeeded,
            self.accounts.len()
        );
        state
    }

    pub async fn run(mut self) {
        loop {
            self.run_pass_and_report().await;
            info!(
                "Sleeping {} hours until the next pass",
                self.interval.as_secs() / 3600
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
