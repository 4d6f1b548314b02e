//! `assetlock demo` — Run the exchange flows against an in-memory ledger.
//!
//! Each flow creates its own asset (or issues fresh tokens), locks it from the
//! locker to the recipient, and then either claims it with the preimage or
//! lets the lock expire and reclaims it. Asset ownership and balances are
//! logged before and after so the effect of each step is visible.

use std::sync::Arc;
use std::time::Duration;

use assetlock_core::{AssetKey, ContractId, Identity};
use assetlock_crypto::commit;
use assetlock_htlc::{
    AssetLedger, BondAsset, BondHtlc, Clock, EventBus, EventKind, EventSubscription,
    FungibleHtlc, HtlcContext, HtlcRegistry, LockState, MemoryLedger, SystemClock,
    TokenAssetType,
};
use clap::{Args, ValueEnum};

use crate::config::AssetLockConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flow {
    /// Lock a bond and claim it, addressed by asset.
    BondClaim,
    /// Lock a bond briefly and reclaim it, addressed by asset.
    BondReclaim,
    /// Lock a bond and claim it, addressed by contract id.
    BondClaimById,
    /// Lock a bond briefly and reclaim it, addressed by contract id.
    BondReclaimById,
    /// Lock tokens and claim them.
    TokenClaim,
    /// Lock tokens briefly and reclaim them.
    TokenReclaim,
}

impl Flow {
    const ALL: [Flow; 6] = [
        Flow::BondClaim,
        Flow::BondReclaim,
        Flow::BondClaimById,
        Flow::BondReclaimById,
        Flow::TokenClaim,
        Flow::TokenReclaim,
    ];
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Run only this flow (default: all flows, in order).
    #[arg(long, value_enum)]
    pub flow: Option<Flow>,
}

pub async fn run(args: &DemoArgs, config: AssetLockConfig) -> anyhow::Result<()> {
    let demo = Demo::new(config)?;
    let flows = match args.flow {
        Some(flow) => vec![flow],
        None => Flow::ALL.to_vec(),
    };

    for flow in flows {
        tracing::info!(?flow, "running flow");
        demo.run_flow(flow).await?;
    }

    tracing::info!(
        records = demo.registry.len(),
        active = demo.registry.active_count(),
        "demo finished"
    );
    Ok(())
}

struct Demo {
    config: AssetLockConfig,
    ledger: Arc<MemoryLedger>,
    registry: Arc<HtlcRegistry>,
    bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    bonds: BondHtlc,
    tokens: FungibleHtlc,
    locker: Identity,
    recipient: Identity,
}

impl Demo {
    fn new(config: AssetLockConfig) -> anyhow::Result<Self> {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.create_token_asset_type(TokenAssetType {
            name: config.demo.token_asset_type.clone(),
            issuer: "Central Bank".into(),
            value: 1,
        })?;

        let registry = Arc::new(HtlcRegistry::new());
        let bus = Arc::new(EventBus::default());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ctx = HtlcContext::new(registry.clone(), ledger.clone(), bus.clone(), clock.clone())
            .with_config(config.htlc.clone());

        Ok(Self {
            locker: Identity::from_certificate(&config.demo.locker),
            recipient: Identity::from_certificate(&config.demo.recipient),
            bonds: BondHtlc::new(ctx.clone()),
            tokens: FungibleHtlc::new(ctx),
            config,
            ledger,
            registry,
            bus,
            clock,
        })
    }

    async fn run_flow(&self, flow: Flow) -> anyhow::Result<()> {
        match flow {
            Flow::BondClaim => self.bond_claim("a020", false).await,
            Flow::BondReclaim => self.bond_reclaim("a021", false).await,
            Flow::BondClaimById => self.bond_claim("a040", true).await,
            Flow::BondReclaimById => self.bond_reclaim("a041", true).await,
            Flow::TokenClaim => self.token_claim().await,
            Flow::TokenReclaim => self.token_reclaim().await,
        }
    }

    async fn bond_claim(&self, asset_id: &str, by_contract_id: bool) -> anyhow::Result<()> {
        let asset_type = self.config.demo.bond_asset_type.as_str();
        let mut events = self.bus.subscribe();
        self.create_bond(asset_id)?;

        let expiry = self.clock.now_secs() + self.config.htlc.default_lock_secs;
        let receipt = self.bonds.lock(
            asset_type,
            asset_id,
            &self.locker,
            &self.recipient,
            &self.hash_lock(),
            expiry,
        )?;
        let contract_id = receipt.contract_id();
        tracing::info!(contract_id = %contract_id, asset_id, "bond locked");
        self.await_event(&mut events, EventKind::LockAsset).await;
        self.log_asset(asset_id)?;

        let state = if by_contract_id {
            self.bonds.is_locked(contract_id)?
        } else {
            self.bonds
                .is_locked_by_asset(asset_type, asset_id, &self.locker, &self.recipient)?
        };
        log_lock_state(&state);

        let preimage = self.config.demo.preimage.as_bytes();
        let claimed = if by_contract_id {
            self.bonds.claim(contract_id, &self.recipient, preimage)?
        } else {
            self.bonds
                .claim_by_asset(asset_type, asset_id, &self.locker, &self.recipient, preimage)?
        };
        tracing::info!(
            contract_id = %claimed.contract_id(),
            status = %claimed.record.status,
            "bond claimed"
        );
        self.await_event(&mut events, EventKind::ClaimAsset).await;
        self.log_asset(asset_id)
    }

    async fn bond_reclaim(&self, asset_id: &str, by_contract_id: bool) -> anyhow::Result<()> {
        let asset_type = self.config.demo.bond_asset_type.as_str();
        let mut events = self.bus.subscribe();
        self.create_bond(asset_id)?;

        let expiry = self.clock.now_secs() + self.config.htlc.short_lock_secs;
        let receipt = self.bonds.lock(
            asset_type,
            asset_id,
            &self.locker,
            &self.recipient,
            &self.hash_lock(),
            expiry,
        )?;
        let contract_id = receipt.contract_id();
        tracing::info!(contract_id = %contract_id, asset_id, expiry, "bond locked briefly");
        self.await_event(&mut events, EventKind::LockAsset).await;
        self.log_asset(asset_id)?;

        // The lock may already have lapsed here; that is reported, not fatal.
        let state = if by_contract_id {
            self.bonds.is_locked(contract_id)
        } else {
            self.bonds
                .is_locked_by_asset(asset_type, asset_id, &self.locker, &self.recipient)
        };
        match state {
            Ok(state) => log_lock_state(&state),
            Err(err) => tracing::warn!(error = %err, "lock query failed"),
        }

        self.wait_until(expiry).await;
        let reclaimed = if by_contract_id {
            self.bonds.reclaim(contract_id, &self.locker)?
        } else {
            self.bonds
                .reclaim_by_asset(asset_type, asset_id, &self.recipient, &self.locker)?
        };
        tracing::info!(
            contract_id = %reclaimed.contract_id(),
            status = %reclaimed.record.status,
            "bond reclaimed"
        );
        self.await_event(&mut events, EventKind::UnlockAsset).await;
        self.log_asset(asset_id)
    }

    async fn token_claim(&self) -> anyhow::Result<()> {
        let mut events = self.bus.subscribe();
        let contract_id = self.lock_tokens(self.config.htlc.default_lock_secs)?;
        self.await_event(&mut events, EventKind::LockFungibleAsset).await;
        self.log_balances("before claim")?;
        log_lock_state(&self.tokens.is_locked(&contract_id)?);

        let claimed = self.tokens.claim(
            &contract_id,
            &self.recipient,
            self.config.demo.preimage.as_bytes(),
        )?;
        tracing::info!(
            contract_id = %claimed.contract_id(),
            status = %claimed.record.status,
            "tokens claimed"
        );
        self.await_event(&mut events, EventKind::ClaimFungibleAsset).await;
        self.log_balances("after claim")
    }

    async fn token_reclaim(&self) -> anyhow::Result<()> {
        let mut events = self.bus.subscribe();
        let contract_id = self.lock_tokens(self.config.htlc.short_lock_secs)?;
        self.await_event(&mut events, EventKind::LockFungibleAsset).await;
        self.log_balances("before reclaim")?;
        match self.tokens.is_locked(&contract_id) {
            Ok(state) => log_lock_state(&state),
            Err(err) => tracing::warn!(error = %err, "lock query failed"),
        }

        let expiry = self.registry.get(&contract_id)?.expiry_time_secs;
        self.wait_until(expiry).await;
        let reclaimed = self.tokens.reclaim(&contract_id, &self.locker)?;
        tracing::info!(
            contract_id = %reclaimed.contract_id(),
            status = %reclaimed.record.status,
            "tokens reclaimed"
        );
        self.await_event(&mut events, EventKind::UnlockFungibleAsset).await;
        self.log_balances("after reclaim")
    }

    fn lock_tokens(&self, lock_secs: u64) -> anyhow::Result<ContractId> {
        let token_type = self.config.demo.token_asset_type.as_str();
        self.ledger
            .issue_tokens(token_type, &self.locker, self.config.demo.token_issue_units)?;
        self.log_balances("after issuance")?;

        let expiry = self.clock.now_secs() + lock_secs;
        let receipt = self.tokens.lock(
            token_type,
            self.config.demo.token_units,
            &self.locker,
            &self.recipient,
            &self.hash_lock(),
            expiry,
        )?;
        tracing::info!(
            contract_id = %receipt.contract_id(),
            units = self.config.demo.token_units,
            "tokens locked"
        );
        Ok(receipt.contract_id().clone())
    }

    fn create_bond(&self, asset_id: &str) -> anyhow::Result<()> {
        self.ledger.create_asset(BondAsset {
            asset_type: self.config.demo.bond_asset_type.clone(),
            id: asset_id.to_string(),
            owner: self.locker.clone(),
            issuer: "Treasury".into(),
            face_value: 500,
            maturity: "02 Dec 29 15:04 MST".into(),
            locked: false,
        })?;
        Ok(())
    }

    fn hash_lock(&self) -> String {
        commit(self.config.demo.preimage.as_bytes())
    }

    async fn await_event(&self, events: &mut EventSubscription, kind: EventKind) {
        let timeout = Duration::from_secs(self.config.htlc.event_timeout_secs);
        if let Some(event) = events.wait_for(kind, timeout).await {
            tracing::info!(
                event = event.name(),
                contract_id = %event.contract_id,
                payload_bytes = event.payload().len(),
                "received event"
            );
        }
    }

    /// Sleep until the clock reaches `expiry`.
    async fn wait_until(&self, expiry: u64) {
        while self.clock.now_secs() < expiry {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    fn log_asset(&self, asset_id: &str) -> anyhow::Result<()> {
        let key = AssetKey::new(self.config.demo.bond_asset_type.clone(), asset_id);
        let asset = self.ledger.read_asset(&key)?;
        let owner = if asset.owner == self.locker {
            "locker"
        } else if asset.owner == self.recipient {
            "recipient"
        } else {
            "other"
        };
        tracing::info!(asset = %key, owner, locked = asset.locked, "asset state");
        Ok(())
    }

    fn log_balances(&self, stage: &str) -> anyhow::Result<()> {
        let token_type = self.config.demo.token_asset_type.as_str();
        let locker = self.ledger.balance(token_type, &self.locker)?;
        let recipient = self.ledger.balance(token_type, &self.recipient)?;
        tracing::info!(stage, token_type, locker, recipient, "token balances");
        Ok(())
    }
}

fn log_lock_state(state: &LockState) {
    tracing::info!(
        contract_id = %state.record.contract_id,
        locked = state.locked,
        status = %state.record.status,
        "lock state"
    );
}
