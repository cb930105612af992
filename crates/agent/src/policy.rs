use std::sync::OnceLock;

use ecopay_core::config::{PolicyConfig, ProgramConfig};
use ecopay_core::domain::credits::{CreditDelta, UserCredits};
use ecopay_core::domain::intent::Intent;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::conversation::{extract_quantity, IntentClassifier};

/// Reply text plus the optional ledger patch the caller must merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponsePayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_delta: Option<CreditDelta>,
}

impl ResponsePayload {
    fn text(content: String) -> Self {
        Self { content, credit_delta: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub intent: Intent,
    pub payload: ResponsePayload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubmissionCheck {
    Missing,
    BelowMinimum(u64),
    AboveMaximum(u64),
    Accepted(u64),
}

/// Stateless reply selection. Identical inputs always produce identical output.
#[derive(Clone, Debug)]
pub struct DialoguePolicy {
    classifier: IntentClassifier,
    policy: PolicyConfig,
    program: ProgramConfig,
}

impl Default for DialoguePolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default(), ProgramConfig::default())
    }
}

impl DialoguePolicy {
    pub fn new(policy: PolicyConfig, program: ProgramConfig) -> Self {
        let classifier = IntentClassifier::new(&program.name);
        Self { classifier, policy, program }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn program(&self) -> &ProgramConfig {
        &self.program
    }

    pub fn respond(&self, text: &str, credits: &UserCredits) -> ResponsePayload {
        self.decide(text, credits).payload
    }

    pub fn decide(&self, text: &str, credits: &UserCredits) -> Decision {
        let intent = self.classifier.classify(text);
        let payload = match intent {
            Intent::Greeting => ResponsePayload::text(self.greeting()),
            Intent::PlasticSubmission => self.submission(text, credits),
            Intent::CreditInquiry => ResponsePayload::text(self.credit_summary(credits)),
            Intent::RedemptionRequest => ResponsePayload::text(self.redemption(credits)),
            Intent::HumanSupport => ResponsePayload::text(self.human_handoff()),
            Intent::RecyclingQuestion => ResponsePayload::text(self.program_overview()),
            Intent::Unrelated => ResponsePayload::text(self.out_of_scope()),
        };

        Decision { intent, payload }
    }

    /// Opening message of a fresh conversation log.
    pub fn welcome(&self) -> String {
        format!(
            "Hello! 🌿 Welcome to {}, turning your plastic waste into real value!\n\n\
             I can help you:\n\
             • Submit plastics for recycling\n\
             • Check your credit balance\n\
             • Redeem your rewards\n\n\
             What would you like to do today?",
            self.program.name
        )
    }

    pub fn cash_value(&self, items: u64) -> Decimal {
        Decimal::from(items).checked_mul(self.policy.cash_per_item).unwrap_or(Decimal::MAX)
    }

    pub fn format_cash(&self, amount: Decimal) -> String {
        format!("{}{}", self.program.currency_symbol, format_amount(amount))
    }

    fn check_submission(&self, text: &str) -> SubmissionCheck {
        match extract_quantity(text) {
            None | Some(0) => SubmissionCheck::Missing,
            Some(quantity) if quantity < self.policy.min_submission => {
                SubmissionCheck::BelowMinimum(quantity)
            }
            Some(quantity) if quantity > self.policy.max_quantity => {
                SubmissionCheck::AboveMaximum(quantity)
            }
            Some(quantity) => SubmissionCheck::Accepted(quantity),
        }
    }

    fn greeting(&self) -> String {
        format!(
            "Hello! 🌿 Welcome to {}! I'm your recycling assistant. I can help you submit \
             plastics, check your credits, or redeem your rewards. What would you like to do today?",
            self.program.name
        )
    }

    fn submission(&self, text: &str, credits: &UserCredits) -> ResponsePayload {
        let minimum = self.policy.min_submission;
        match self.check_submission(text) {
            SubmissionCheck::Missing => ResponsePayload::text(format!(
                "I'd love to help you submit plastics! 🌱 How many plastic items do you have? \
                 Please provide a number (minimum {minimum} plastics per submission)."
            )),
            SubmissionCheck::BelowMinimum(quantity) => ResponsePayload::text(format!(
                "You mentioned {quantity} plastics, but the minimum submission is \
                 **{minimum} plastics**. Keep collecting, you're almost there! 💪♻️"
            )),
            SubmissionCheck::AboveMaximum(quantity) => ResponsePayload::text(format!(
                "That's a big haul! 🚛 **{quantity} plastics** is more than we can log in one \
                 submission (maximum **{} plastics**).\n\nPlease split it into smaller \
                 submissions or visit our collection center in **{}** so an agent can weigh it \
                 with you.",
                self.policy.max_quantity, self.program.location
            )),
            SubmissionCheck::Accepted(quantity) => {
                let credits_earned = quantity.saturating_mul(self.policy.credits_per_item);
                let cash = self.format_cash(self.cash_value(quantity));
                let content = format!(
                    "Great! You're submitting **{quantity} plastics**.\n\n\
                     💰 You'll earn **{credits_earned} credits** ({cash}).\n\n\
                     Please drop off your plastics at our collection center in **{}**. \
                     Credits will be added after verification. ✅",
                    self.program.location
                );

                ResponsePayload {
                    content,
                    credit_delta: Some(CreditDelta::pending(
                        credits.pending.saturating_add(credits_earned),
                    )),
                }
            }
        }
    }

    fn credit_summary(&self, credits: &UserCredits) -> String {
        let threshold = self.policy.redemption_threshold;
        let outlook = if credits.total >= threshold {
            "🎉 You're eligible for redemption! Type **redeem** to get started.".to_string()
        } else {
            format!(
                "Keep recycling! You need **{} more credits** to redeem.",
                threshold - credits.total
            )
        };

        format!(
            "Here's your credit summary 📊:\n\n\
             ✅ **Total Credits:** {}\n\
             ⏳ **Pending:** {}\n\
             🎁 **Redeemed:** {}\n\
             💵 **Cash Value:** {}\n\n\
             {outlook}",
            credits.total,
            credits.pending,
            credits.redeemed,
            self.format_cash(self.cash_value(credits.total)),
        )
    }

    fn redemption(&self, credits: &UserCredits) -> String {
        let threshold = self.policy.redemption_threshold;
        if credits.total < threshold {
            return format!(
                "You currently have **{} credits**. You need at least **{threshold} credits** \
                 to redeem, that's **{} more credits** to go. Keep recycling! 🌍♻️",
                credits.total,
                threshold - credits.total
            );
        }

        format!(
            "🎉 You're eligible to redeem your credits! Choose an option:\n\n\
             💵 **Cash**: an agent from {} will assist you\n\
             🎁 **Rewards**: browse available rewards\n\n\
             Type **cash** or **rewards** to proceed.",
            self.program.name
        )
    }

    fn human_handoff(&self) -> String {
        format!(
            "I'll connect you with one of our agents right away. 🙋‍♂️\n\n\
             **Someone from the {} team will assist you shortly.** Please hold on while we \
             route your request.\n\n\
             📍 You can also visit us at our office in **{}**.",
            self.program.name, self.program.location
        )
    }

    fn program_overview(&self) -> String {
        let rate = self.policy.credits_per_item;
        format!(
            "Great question about recycling! ♻️ Here's how {} works:\n\n\
             1️⃣ **Collect** at least {} plastic items\n\
             2️⃣ **Submit** them at our center in {}\n\
             3️⃣ **Earn** {rate} {} per plastic ({} each)\n\
             4️⃣ **Redeem** once you reach {} credits\n\n\
             Need help with something specific? Just ask!",
            self.program.name,
            self.policy.min_submission,
            self.program.location,
            if rate == 1 { "credit" } else { "credits" },
            self.format_cash(self.policy.cash_per_item),
            group_thousands(self.policy.redemption_threshold),
        )
    }

    fn out_of_scope(&self) -> String {
        format!(
            "I appreciate your message, but I'm here to help only with \
             **{} recycling services**. 🌿\n\n\
             I can help you with:\n\
             • Submitting plastics\n\
             • Checking your credits\n\
             • Redeeming rewards\n\n\
             How can I assist you with recycling today?",
            self.program.name
        )
    }
}

fn default_policy() -> &'static DialoguePolicy {
    static POLICY: OnceLock<DialoguePolicy> = OnceLock::new();
    POLICY.get_or_init(DialoguePolicy::default)
}

pub fn generate_response(text: &str, credits: &UserCredits) -> ResponsePayload {
    default_policy().respond(text, credits)
}

/// Locale-style amount: thousands separators, at most two decimals, no
/// trailing zeros.
pub fn format_amount(amount: Decimal) -> String {
    let normalized = amount.round_dp(2).normalize().to_string();
    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (normalized.as_str(), None),
    };
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", whole),
    };

    let mut formatted = format!("{sign}{}", group_digits(digits));
    if let Some(fraction) = fraction {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted
}

pub fn group_thousands(value: u64) -> String {
    group_digits(&value.to_string())
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use ecopay_core::config::{PolicyConfig, ProgramConfig};
    use ecopay_core::domain::credits::{CreditDelta, UserCredits};
    use ecopay_core::domain::intent::Intent;
    use rust_decimal::Decimal;

    use super::{format_amount, generate_response, group_thousands, DialoguePolicy};

    fn credits(total: u64, pending: u64, redeemed: u64) -> UserCredits {
        UserCredits::new(total, pending, redeemed)
    }

    #[test]
    fn submission_below_minimum_reports_minimum_without_delta() {
        let payload = generate_response("I want to submit 50 plastics", &credits(250, 0, 0));

        assert!(payload.content.contains("**100 plastics**"));
        assert!(payload.content.contains("50 plastics"));
        assert_eq!(payload.credit_delta, None);
    }

    #[test]
    fn accepted_submission_adds_pending_credits() {
        let payload = generate_response("I want to submit 150 plastics", &credits(250, 0, 0));

        assert_eq!(payload.credit_delta, Some(CreditDelta::pending(150)));
        assert!(payload.content.contains("**150 plastics**"));
        assert!(payload.content.contains("**150 credits**"));
        assert!(payload.content.contains("(₦75)"));
        assert!(payload.content.contains("Ilara Mokin, Ondo State"));
    }

    #[test]
    fn pending_delta_is_relative_to_the_snapshot() {
        let payload = generate_response("submit 100 bottles", &credits(250, 40, 0));
        assert_eq!(payload.credit_delta, Some(CreditDelta::pending(140)));
    }

    #[test]
    fn odd_quantities_show_fractional_cash() {
        let payload = generate_response("submit 101 plastics", &credits(0, 0, 0));
        assert!(payload.content.contains("(₦50.5)"));
    }

    #[test]
    fn submission_without_quantity_asks_for_one() {
        for text in ["I want to submit plastics", "submit 0 plastics"] {
            let payload = generate_response(text, &credits(250, 0, 0));
            assert!(payload.content.contains("How many plastic items"), "{text}");
            assert!(payload.content.contains("minimum 100 plastics"), "{text}");
            assert_eq!(payload.credit_delta, None, "{text}");
        }
    }

    #[test]
    fn oversized_submission_is_rejected() {
        let payload = generate_response("submit 5000000 plastics", &credits(250, 0, 0));

        assert!(payload.content.contains("maximum **1000000 plastics**"));
        assert_eq!(payload.credit_delta, None);

        let saturated =
            generate_response("submit 99999999999999999999999 plastics", &credits(250, 0, 0));
        assert_eq!(saturated.credit_delta, None);
    }

    #[test]
    fn submission_at_maximum_is_accepted() {
        let payload = generate_response("submit 1000000 plastics", &credits(0, 0, 0));

        assert_eq!(payload.credit_delta, Some(CreditDelta::pending(1_000_000)));
        assert!(payload.content.contains("(₦500,000)"));
    }

    #[test]
    fn pending_total_saturates() {
        let payload = generate_response("submit 200 plastics", &credits(0, u64::MAX - 10, 0));
        assert_eq!(payload.credit_delta, Some(CreditDelta::pending(u64::MAX)));
    }

    #[test]
    fn balance_at_threshold_invites_redemption() {
        let payload = generate_response("check my balance", &credits(1_000, 0, 0));

        assert!(payload.content.contains("Type **redeem** to get started"));
        assert!(payload.content.contains("**Total Credits:** 1000"));
        assert!(payload.content.contains("**Cash Value:** ₦500"));
        assert_eq!(payload.credit_delta, None);
    }

    #[test]
    fn balance_below_threshold_reports_shortfall() {
        let payload = generate_response("check my balance", &credits(250, 150, 20));

        assert!(payload.content.contains("**750 more credits**"));
        assert!(payload.content.contains("**Pending:** 150"));
        assert!(payload.content.contains("**Redeemed:** 20"));
        assert!(payload.content.contains("₦125"));
    }

    #[test]
    fn redemption_below_threshold_states_shortfall() {
        let payload = generate_response("redeem", &credits(500, 0, 0));

        assert!(payload.content.contains("**500 credits**"));
        assert!(payload.content.contains("**1000 credits**"));
        assert!(payload.content.contains("**500 more credits**"));
        assert_eq!(payload.credit_delta, None);
    }

    #[test]
    fn redemption_at_threshold_offers_cash_or_rewards() {
        let payload = generate_response("I want to redeem my credits", &credits(1_200, 0, 0));

        assert!(payload.content.contains("**Cash**"));
        assert!(payload.content.contains("**Rewards**"));
        assert!(payload.content.contains("an agent from Ecopay"));
        assert_eq!(payload.credit_delta, None);
    }

    #[test]
    fn fixed_replies_for_remaining_intents() {
        let snapshot = credits(250, 0, 0);

        let greeting = generate_response("hi, I want to recycle", &snapshot);
        assert!(greeting.content.starts_with("Hello! 🌿 Welcome to Ecopay!"));

        let support = generate_response("can I talk to someone", &snapshot);
        assert!(support.content.contains("**Ilara Mokin, Ondo State**"));

        let overview = generate_response("why recycle?", &snapshot);
        assert!(overview.content.contains("at least 100 plastic items"));
        assert!(overview.content.contains("1 credit per plastic (₦0.5 each)"));
        assert!(overview.content.contains("reach 1,000 credits"));

        let unrelated = generate_response("tell me a joke", &snapshot);
        assert!(unrelated.content.contains("**Ecopay recycling services**"));

        for payload in [greeting, support, overview, unrelated] {
            assert_eq!(payload.credit_delta, None);
        }
    }

    #[test]
    fn responses_are_idempotent() {
        let snapshot = credits(250, 0, 0);
        let first = generate_response("I want to submit 150 plastics", &snapshot);
        let second = generate_response("I want to submit 150 plastics", &snapshot);

        assert_eq!(first, second);
    }

    #[test]
    fn decide_reports_the_classified_intent() {
        let policy = DialoguePolicy::default();
        let decision = policy.decide("250 plastics", &credits(0, 0, 0));

        assert_eq!(decision.intent, Intent::PlasticSubmission);
        assert_eq!(decision.payload.credit_delta, Some(CreditDelta::pending(250)));
    }

    #[test]
    fn configured_parameters_drive_thresholds_and_copy() {
        let policy = DialoguePolicy::new(
            PolicyConfig {
                min_submission: 50,
                credits_per_item: 2,
                cash_per_item: Decimal::new(25, 2),
                redemption_threshold: 400,
                max_quantity: 10_000,
            },
            ProgramConfig {
                name: "GreenLoop".to_string(),
                location: "Yaba, Lagos".to_string(),
                currency_symbol: "$".to_string(),
            },
        );

        let submission = policy.respond("submit 60 plastics", &credits(0, 0, 0));
        assert_eq!(submission.credit_delta, Some(CreditDelta::pending(120)));
        assert!(submission.content.contains("**120 credits** ($15)"));
        assert!(submission.content.contains("Yaba, Lagos"));

        let redemption = policy.respond("redeem", &credits(400, 0, 0));
        assert!(redemption.content.contains("an agent from GreenLoop"));

        let overview = policy.respond("what is greenloop", &credits(0, 0, 0));
        assert!(overview.content.contains("2 credits per plastic ($0.25 each)"));
    }

    #[test]
    fn amounts_format_like_locale_strings() {
        assert_eq!(format_amount(Decimal::new(75, 0)), "75");
        assert_eq!(format_amount(Decimal::new(755, 1)), "75.5");
        assert_eq!(format_amount(Decimal::new(12_500, 1)), "1,250");
        assert_eq!(format_amount(Decimal::new(123_456_789, 2)), "1,234,567.89");
        assert_eq!(format_amount(Decimal::ZERO), "0");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(999), "999");
    }
}
