//! Guest checkout orchestration.
//!
//! Walks the one-page checkout in a fixed order:
//!
//! ```text
//! Guest Checkout -> Billing Address -> Shipping Method -> Payment Method
//!     -> Payment Information -> Confirm Order -> Extract Order
//! ```
//!
//! Each step waits for its controls, runs its action through the
//! [`CheckoutSite`], and is timed. The first failure aborts the walk with
//! [`ShopError::CheckoutAborted`] naming the step; nothing is retried.

use crate::model::{GuestUserProfile, OrderConfirmation, PaymentMethod};
use crate::result::{ShopError, ShopResult};
use crate::site::CheckoutSite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Steps of the guest checkout, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutStep {
    /// Optional "Checkout as Guest" prompt
    GuestCheckout,
    /// Billing address form
    BillingAddress,
    /// In-store pickup
    ShippingMethod,
    /// Payment method choice
    PaymentMethod,
    /// Payment information pass-through
    PaymentInformation,
    /// Order placement
    ConfirmOrder,
    /// Order number and total
    ExtractOrder,
}

impl CheckoutStep {
    /// Every step in walk order
    pub const ALL: [Self; 7] = [
        Self::GuestCheckout,
        Self::BillingAddress,
        Self::ShippingMethod,
        Self::PaymentMethod,
        Self::PaymentInformation,
        Self::ConfirmOrder,
        Self::ExtractOrder,
    ];

    /// Human-readable name used in errors and logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GuestCheckout => "Guest Checkout",
            Self::BillingAddress => "Billing Address",
            Self::ShippingMethod => "Shipping Method",
            Self::PaymentMethod => "Payment Method",
            Self::PaymentInformation => "Payment Information",
            Self::ConfirmOrder => "Confirm Order",
            Self::ExtractOrder => "Extract Order",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Action completed
    Passed,
    /// Nothing to do on this run (guest prompt absent)
    Skipped,
    /// Action failed; the walk stopped here
    Failed,
}

/// Timing and outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step
    pub step: CheckoutStep,
    /// Outcome
    pub status: StepStatus,
    /// Wall time spent in the step
    pub duration_ms: u64,
    /// Extra detail, e.g. how pickup was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Failure text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drives a [`CheckoutSite`] through the guest checkout
#[derive(Debug)]
pub struct CheckoutOrchestrator<'s, S: CheckoutSite + ?Sized> {
    site: &'s S,
    payment: PaymentMethod,
    steps: Vec<StepRecord>,
}

impl<'s, S: CheckoutSite + ?Sized> CheckoutOrchestrator<'s, S> {
    /// Create an orchestrator paying with the default method
    #[must_use]
    pub fn new(site: &'s S) -> Self {
        Self {
            site,
            payment: PaymentMethod::default(),
            steps: Vec::new(),
        }
    }

    /// Pay with a different method
    #[must_use]
    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment = method;
        self
    }

    /// Records of the steps run so far
    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Consume the orchestrator, keeping its step records
    #[must_use]
    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }

    /// Walk the whole checkout and return the placed order.
    ///
    /// The cart must already hold products and the terms must be accepted;
    /// the walk starts on the page the cart's Checkout button leads to.
    pub async fn complete_checkout(
        &mut self,
        profile: &GuestUserProfile,
    ) -> ShopResult<OrderConfirmation> {
        self.steps.clear();
        let site = self.site;
        let payment = self.payment;
        tracing::info!(customer = %profile.full_name(), %payment, "starting guest checkout");

        let shown = self
            .run(CheckoutStep::GuestCheckout, async {
                site.acknowledge_guest_checkout().await
            })
            .await?;
        if !shown {
            if let Some(record) = self.steps.last_mut() {
                record.status = StepStatus::Skipped;
            }
        }

        self.run(CheckoutStep::BillingAddress, async {
            site.wait_ready(CheckoutStep::BillingAddress).await?;
            site.submit_billing_address(profile).await
        })
        .await?;

        let pickup = self
            .run(CheckoutStep::ShippingMethod, async {
                site.wait_ready(CheckoutStep::ShippingMethod).await?;
                site.select_shipping_method().await
            })
            .await?;
        if let Some(record) = self.steps.last_mut() {
            record.detail = Some(format!("{pickup:?}"));
        }

        self.run(CheckoutStep::PaymentMethod, async {
            site.wait_ready(CheckoutStep::PaymentMethod).await?;
            site.select_payment_method(payment).await
        })
        .await?;

        self.run(CheckoutStep::PaymentInformation, async {
            site.wait_ready(CheckoutStep::PaymentInformation).await?;
            site.submit_payment_information().await
        })
        .await?;

        self.run(CheckoutStep::ConfirmOrder, async {
            site.wait_ready(CheckoutStep::ConfirmOrder).await?;
            site.confirm_order().await
        })
        .await?;

        let confirmation = self
            .run(CheckoutStep::ExtractOrder, async {
                site.wait_ready(CheckoutStep::ExtractOrder).await?;
                let order_number = site
                    .order_number()
                    .await?
                    .ok_or_else(|| ShopError::extraction_miss("order number"))?;
                let order_total = site.order_total().await?;
                Ok(OrderConfirmation {
                    order_number,
                    order_total,
                })
            })
            .await?;
        tracing::info!(
            order_number = %confirmation.order_number,
            order_total = ?confirmation.order_total,
            "order placed"
        );
        Ok(confirmation)
    }

    async fn run<T>(
        &mut self,
        step: CheckoutStep,
        action: impl std::future::Future<Output = ShopResult<T>>,
    ) -> ShopResult<T> {
        tracing::debug!(step = step.name(), "step started");
        let start = Instant::now();
        let result = action.await;
        let duration_ms = duration_ms(start.elapsed());
        match result {
            Ok(value) => {
                tracing::info!(step = step.name(), duration_ms, "step finished");
                self.steps.push(StepRecord {
                    step,
                    status: StepStatus::Passed,
                    duration_ms,
                    detail: None,
                    error: None,
                });
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(step = step.name(), duration_ms, error = %e, "step failed");
                self.steps.push(StepRecord {
                    step,
                    status: StepStatus::Failed,
                    duration_ms,
                    detail: None,
                    error: Some(e.to_string()),
                });
                Err(ShopError::aborted(step.name(), e))
            }
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::PickupSelection;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Scripted site recording the order of calls
    #[derive(Debug, Default)]
    struct ScriptedSite {
        guest_prompt: bool,
        fail_at: Option<CheckoutStep>,
        order_number: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSite {
        fn ok() -> Self {
            Self {
                order_number: Some("2207822".to_string()),
                ..Self::default()
            }
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn act(&self, step: CheckoutStep) -> ShopResult<()> {
            self.log(step.name());
            if self.fail_at == Some(step) {
                return Err(ShopError::interaction(
                    format!("click Continue on {}", step.name()),
                    "element is detached",
                ));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutSite for ScriptedSite {
        async fn wait_ready(&self, step: CheckoutStep) -> ShopResult<()> {
            self.log(format!("ready:{}", step.name()));
            Ok(())
        }

        async fn acknowledge_guest_checkout(&self) -> ShopResult<bool> {
            self.act(CheckoutStep::GuestCheckout)?;
            Ok(self.guest_prompt)
        }

        async fn submit_billing_address(&self, profile: &GuestUserProfile) -> ShopResult<()> {
            profile.validate()?;
            self.act(CheckoutStep::BillingAddress)
        }

        async fn select_shipping_method(&self) -> ShopResult<PickupSelection> {
            self.act(CheckoutStep::ShippingMethod)?;
            Ok(PickupSelection::AlreadySelected)
        }

        async fn select_payment_method(&self, method: PaymentMethod) -> ShopResult<()> {
            self.log(format!("method:{method}"));
            self.act(CheckoutStep::PaymentMethod)
        }

        async fn submit_payment_information(&self) -> ShopResult<()> {
            self.act(CheckoutStep::PaymentInformation)
        }

        async fn confirm_order(&self) -> ShopResult<()> {
            self.act(CheckoutStep::ConfirmOrder)
        }

        async fn order_number(&self) -> ShopResult<Option<String>> {
            self.act(CheckoutStep::ExtractOrder)?;
            Ok(self.order_number.clone())
        }

        async fn order_total(&self) -> ShopResult<Option<Decimal>> {
            Ok(Some(Decimal::new(159_700, 2)))
        }
    }

    fn profile() -> GuestUserProfile {
        serde_json::from_str(
            r#"{
                "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com",
                "country": "United States", "state": "New York", "city": "New York",
                "address1": "1 Main St", "zipCode": "10001", "phoneNumber": "5551234567"
            }"#,
        )
        .unwrap()
    }

    mod step_tests {
        use super::*;

        #[test]
        fn test_step_names_and_order() {
            let names: Vec<_> = CheckoutStep::ALL.iter().map(|s| s.name()).collect();
            assert_eq!(
                names,
                [
                    "Guest Checkout",
                    "Billing Address",
                    "Shipping Method",
                    "Payment Method",
                    "Payment Information",
                    "Confirm Order",
                    "Extract Order",
                ]
            );
            assert_eq!(CheckoutStep::ShippingMethod.to_string(), "Shipping Method");
        }

        #[test]
        fn test_record_serializes_compactly() {
            let record = StepRecord {
                step: CheckoutStep::PaymentInformation,
                status: StepStatus::Passed,
                duration_ms: 12,
                detail: None,
                error: None,
            };
            let json = serde_json::to_string(&record).unwrap();
            assert_eq!(
                json,
                r#"{"step":"payment-information","status":"passed","duration_ms":12}"#
            );
        }
    }

    mod walk_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_happy_path_runs_every_step_in_order() {
            let site = ScriptedSite::ok();
            let mut checkout = CheckoutOrchestrator::new(&site);
            let confirmation = checkout.complete_checkout(&profile()).await.unwrap();

            assert_eq!(confirmation.order_number, "2207822");
            assert_eq!(confirmation.numeric_order_number(), Some(2_207_822));
            assert_eq!(confirmation.order_total, Some(Decimal::new(159_700, 2)));

            let actions: Vec<_> = site
                .calls()
                .into_iter()
                .filter(|c| !c.starts_with("ready:") && !c.starts_with("method:"))
                .collect();
            let expected: Vec<_> = CheckoutStep::ALL.iter().map(|s| s.name().to_string()).collect();
            assert_eq!(actions, expected);

            let steps = checkout.steps();
            assert_eq!(steps.len(), 7);
            assert_eq!(steps[0].status, StepStatus::Skipped);
            assert!(steps[1..].iter().all(|s| s.status == StepStatus::Passed));
            assert_eq!(steps[2].detail.as_deref(), Some("AlreadySelected"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_guest_prompt_shown_is_passed() {
            let site = ScriptedSite {
                guest_prompt: true,
                ..ScriptedSite::ok()
            };
            let mut checkout = CheckoutOrchestrator::new(&site);
            checkout.complete_checkout(&profile()).await.unwrap();
            assert_eq!(checkout.steps()[0].status, StepStatus::Passed);
        }

        #[tokio::test(start_paused = true)]
        async fn test_readiness_precedes_action() {
            let site = ScriptedSite::ok();
            CheckoutOrchestrator::new(&site)
                .complete_checkout(&profile())
                .await
                .unwrap();
            let calls = site.calls();
            let ready = calls.iter().position(|c| c == "ready:Billing Address").unwrap();
            let action = calls.iter().position(|c| c == "Billing Address").unwrap();
            assert!(ready < action);
        }

        #[tokio::test(start_paused = true)]
        async fn test_payment_method_is_forwarded() {
            let site = ScriptedSite::ok();
            CheckoutOrchestrator::new(&site)
                .with_payment_method(PaymentMethod::CheckMoneyOrder)
                .complete_checkout(&profile())
                .await
                .unwrap();
            assert!(site.calls().contains(&"method:Check / Money Order".to_string()));
        }
    }

    mod abort_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_failure_aborts_with_step_name() {
            let site = ScriptedSite {
                fail_at: Some(CheckoutStep::ShippingMethod),
                ..ScriptedSite::ok()
            };
            let mut checkout = CheckoutOrchestrator::new(&site);
            let err = checkout.complete_checkout(&profile()).await.unwrap_err();

            assert_eq!(err.failed_step(), Some("Shipping Method"));
            assert!(err
                .to_string()
                .contains("Failed to click Continue on Shipping Method"));
            assert!(!site.calls().iter().any(|c| c == "Payment Method"));
            assert!(!site.calls().iter().any(|c| c == "Confirm Order"));

            let last = checkout.steps().last().unwrap();
            assert_eq!(last.step, CheckoutStep::ShippingMethod);
            assert_eq!(last.status, StepStatus::Failed);
            assert!(last.error.is_some());
        }

        #[tokio::test(start_paused = true)]
        async fn test_invalid_profile_aborts_at_billing() {
            let site = ScriptedSite::ok();
            let mut profile = profile();
            profile.email.clear();
            let err = CheckoutOrchestrator::new(&site)
                .complete_checkout(&profile)
                .await
                .unwrap_err();
            assert_eq!(err.failed_step(), Some("Billing Address"));
            match err {
                ShopError::CheckoutAborted { source, .. } => {
                    assert!(matches!(*source, ShopError::InvalidProfile { field: "email" }));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_order_number_is_extraction_miss() {
            let site = ScriptedSite {
                order_number: None,
                ..ScriptedSite::ok()
            };
            let err = CheckoutOrchestrator::new(&site)
                .complete_checkout(&profile())
                .await
                .unwrap_err();
            assert_eq!(err.failed_step(), Some("Extract Order"));
            match err {
                ShopError::CheckoutAborted { source, .. } => {
                    assert!(matches!(*source, ShopError::ExtractionMiss { .. }));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_confirm_is_not_retried() {
            let site = ScriptedSite {
                fail_at: Some(CheckoutStep::ConfirmOrder),
                ..ScriptedSite::ok()
            };
            let _ = CheckoutOrchestrator::new(&site)
                .complete_checkout(&profile())
                .await;
            let confirms = site.calls().iter().filter(|c| *c == "Confirm Order").count();
            assert_eq!(confirms, 1);
        }
    }
}
