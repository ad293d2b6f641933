//! Document reconciliation — posting one parsed invoice as an ERP
//! purchase document.
//!
//! One [`Reconciler::reconcile`] call runs the whole pipeline inside a
//! single transaction: supplier resolution, find-or-create header by the
//! invoice natural key, non-destructive payment-schedule upsert, and —
//! only when the header has no lines yet — per-line article resolution,
//! pricing, and the price preservation policy. A dry run performs every
//! lookup and decision and then rolls the transaction back.
//!
//! Idempotency is coarse: re-running the same invoice reuses the header
//! and inserts no lines if any exist. A partially imported invoice is
//! never topped up line by line; the line batch is all-or-nothing.

pub mod policy;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{
    DocumentStatus, ImportConfig, ImportError, InvoiceHeader, InvoiceLine, PriceAction,
    PriceChange, ReconcileReport, Resolution, ResolutionStats, SchemaTarget,
};
use crate::pricing;
use crate::resolve::{ArticleResolver, SupplierResolver};
use crate::store::{AuditRecord, AuditStore, Store, catalog, documents};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Posts parsed invoices into the document store.
pub struct Reconciler<'a> {
    store: &'a mut Store,
    audit: Option<&'a AuditStore>,
    supplier_resolver: SupplierResolver,
    cfg: ImportConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut Store, cfg: ImportConfig) -> Self {
        Self {
            store,
            audit: None,
            supplier_resolver: SupplierResolver::new(),
            cfg,
        }
    }

    /// Attach the local price-change audit log.
    pub fn with_audit(mut self, audit: &'a AuditStore) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Swap the supplier resolver (custom alias tables).
    pub fn with_supplier_resolver(mut self, resolver: SupplierResolver) -> Self {
        self.supplier_resolver = resolver;
        self
    }

    /// Post one invoice. Returns the report; `document_id` is `None`
    /// under `dry_run`.
    pub fn reconcile(
        &mut self,
        header: &InvoiceHeader,
        lines: &[InvoiceLine],
        dry_run: bool,
    ) -> Result<ReconcileReport, ImportError> {
        self.check_safety_gate(dry_run)?;
        let cfg = self.cfg.clone();
        let prefix = cfg.target.prefix();
        let audit = self.audit;

        let tx = self.store.conn_mut().transaction()?;

        let supplier_code =
            self.supplier_resolver
                .resolve(&tx, prefix, &header.supplier_name)?;
        info!(
            supplier = %header.supplier_name,
            code = %supplier_code,
            "supplier resolved"
        );

        // 1) Header: reuse by natural key, create otherwise.
        let existing = documents::find_header(
            &tx,
            prefix,
            &header.invoice_number,
            &cfg.document_type,
            &cfg.warehouse,
        )?;
        let (header_id, document_number, status) = match existing {
            Some(row) => {
                info!(
                    document_number = %row.document_number,
                    header_id = row.id,
                    "existing header reused"
                );
                (row.id, row.document_number, DocumentStatus::Reused)
            }
            None => {
                let number = documents::next_document_number(&tx, prefix, header.invoice_date)?;
                let id =
                    documents::insert_header(&tx, prefix, &cfg, header, &number, &supplier_code)?;
                info!(document_number = %number, header_id = id, "header created");
                (id, number, DocumentStatus::Created)
            }
        };

        // 2) Payment schedule: record the due date so the invoice shows up
        //    in payment lists; never clobber populated values on retry.
        let payment_amount = if header.payable_amount > Decimal::ZERO {
            header.payable_amount
        } else if header.cash_discount > Decimal::ZERO {
            header.cash_discount
        } else {
            Decimal::ZERO
        };
        if header.due_date.is_some() || payment_amount > Decimal::ZERO {
            if documents::payment_exists(&tx, prefix, &cfg.document_type, &document_number)? {
                documents::update_payment_missing(
                    &tx,
                    prefix,
                    &cfg,
                    &document_number,
                    header.due_date,
                    payment_amount,
                )?;
            } else {
                documents::insert_payment(
                    &tx,
                    prefix,
                    &cfg,
                    header,
                    &document_number,
                    payment_amount,
                )?;
            }
        }

        // 3) Lines: only when the header has none yet.
        let mut stats = ResolutionStats::default();
        let mut price_changes: Vec<PriceChange> = Vec::new();
        let mut lines_inserted = 0usize;
        let existing_lines = documents::line_count(&tx, prefix, header_id)?;
        if existing_lines == 0 && !lines.is_empty() {
            let mut resolver = ArticleResolver::new(cfg.allow_auto_create);
            for line in lines {
                let resolved = match resolver.resolve(&tx, prefix, line) {
                    Ok(Some(resolved)) => resolved,
                    Ok(None) => {
                        stats.record(Resolution::NotFound);
                        continue;
                    }
                    Err(e) => {
                        warn!(name = %line.name, error = %e, "line resolution failed, skipping");
                        stats.record(Resolution::NotFound);
                        continue;
                    }
                };
                stats.record(resolved.resolution);

                let vat_pct = line.vat_pct.unwrap_or(cfg.default_vat_pct);
                let breakdown = pricing::compute(
                    line.purchase_price,
                    line.discount_pct,
                    vat_pct,
                    cfg.default_margin_pct,
                    cfg.overhead_pct,
                    cfg.rounding,
                    cfg.round_threshold,
                );

                let prior = if resolved.resolution == Resolution::Created {
                    None
                } else {
                    catalog::last_purchase(&tx, prefix, &resolved.code)?
                };
                let decision = policy::decide(
                    &resolved.code,
                    resolved.resolution,
                    &breakdown,
                    prior.as_ref(),
                    line.purchase_price,
                    line.discount_pct,
                    vat_pct,
                    line.quantity,
                    cfg.price_tolerance,
                    cfg.preserve_existing_price,
                );

                if let Some(change) = &decision.change {
                    info!(
                        article = %change.article_code,
                        old = %change.old_price,
                        new = %change.new_price,
                        "purchase price moved, consumer price recalculated"
                    );
                    if !dry_run {
                        if let (Some(audit), Some(prior)) = (audit, prior.as_ref()) {
                            audit.record(&AuditRecord {
                                document_id: Some(header_id),
                                article_code: change.article_code.clone(),
                                computed_price: breakdown.price_rounded,
                                old_price: change.old_price,
                                new_price: change.new_price,
                                old_purchase: Some(prior.purchase_price),
                                new_purchase: line.purchase_price,
                                quantity: line.quantity,
                                action: PriceAction::RecalcPurchaseChanged,
                            })?;
                        }
                    }
                    price_changes.push(change.clone());
                }

                let price_excl_vat = match decision.action {
                    PriceAction::Preserved => {
                        (decision.final_price / (Decimal::ONE + vat_pct / HUNDRED)).round_dp(4)
                    }
                    _ => breakdown.price_excl_vat,
                };
                documents::insert_line(
                    &tx,
                    prefix,
                    header_id,
                    &documents::LineRow {
                        article_code: resolved.code,
                        unit: "KOM".to_string(),
                        quantity: line.quantity,
                        purchase_price: line.purchase_price,
                        discount_pct: line.discount_pct,
                        overhead: cfg.overhead_pct,
                        margin_pct: decision.final_margin_pct,
                        consumer_price_excl_vat: price_excl_vat,
                        vat_pct,
                        consumer_price_incl_vat: decision.final_price,
                        batch: line.batch.clone(),
                        expiry: line.expiry,
                    },
                )?;
                lines_inserted += 1;
            }
            info!(
                inserted = lines_inserted,
                found = stats.found,
                created = stats.created,
                barcode_added = stats.barcode_added,
                sifra_fallback = stats.sifra_fallback,
                not_found = stats.not_found,
                "line batch written"
            );
        } else if existing_lines > 0 {
            info!(existing = existing_lines, "lines already exist, skipping line insert");
        }

        let document_id = if dry_run {
            tx.rollback()?;
            info!("dry run — transaction rolled back");
            None
        } else {
            tx.commit()?;
            Some(header_id)
        };

        Ok(ReconcileReport {
            document_id,
            document_number,
            status,
            supplier_code,
            lines_inserted,
            stats,
            price_changes,
        })
    }

    /// Reject disallowed write targets before touching anything.
    fn check_safety_gate(&self, dry_run: bool) -> Result<(), ImportError> {
        match self.cfg.target {
            SchemaTarget::RemoteProxy if !dry_run => Err(ImportError::SafetyGate(
                "cannot write through the remote proxy schema: the proxy cannot allocate \
                 identity values for header/line/payment rows — connect to the production \
                 store directly and opt in with allow_remote_write"
                    .into(),
            )),
            SchemaTarget::RemoteDirect if !self.cfg.allow_remote_write => {
                Err(ImportError::SafetyGate(
                    "direct write to the production store requires the allow_remote_write opt-in"
                        .into(),
                ))
            }
            _ => Ok(()),
        }
    }
}
