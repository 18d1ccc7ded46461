//! Built-in baseline corpus for the statistical outlier detector.
//!
//! A small sample of unremarkable clauses drawn from typical consumer terms.
//! The outlier detector is fitted over this corpus at pipeline construction
//! so it is never queried unfitted; deployments with a richer corpus can fit
//! over their own.

/// Ordinary, non-alarming clause texts used as the default fit corpus.
pub fn builtin_baseline_corpus() -> Vec<String> {
    BASELINE.iter().map(|s| s.to_string()).collect()
}

const BASELINE: &[&str] = &[
    "These terms of service govern your use of our website and services.",
    "By creating an account, you agree to provide accurate registration information.",
    "You are responsible for maintaining the confidentiality of your password.",
    "We provide customer support through email during normal business hours.",
    "You may update your account information at any time through your profile settings.",
    "Our service is intended for users who are at least eighteen years of age.",
    "We use cookies to remember your preferences and improve your experience.",
    "Payments are processed securely through our third-party payment processor.",
    "You may contact us with questions about these terms at the address below.",
    "We will notify you of material changes to these terms by email.",
    "Your subscription gives you access to the features described on our pricing page.",
    "Invoices are issued monthly and payment is due within thirty days.",
    "You may cancel your subscription at any time from your account dashboard.",
    "Refund requests are reviewed within five business days of submission.",
    "We strive to keep the service available but may perform scheduled maintenance.",
    "Content you upload remains yours; we only use it to operate the service.",
    "We collect the information you provide when you register for an account.",
    "You can request a copy of your personal data by contacting our support team.",
    "We protect your information using industry-standard security measures.",
    "If any provision of these terms is found unenforceable, the rest remain in effect.",
    "These terms constitute the entire agreement between you and us.",
    "You may not use the service for any unlawful purpose.",
    "We may offer promotional discounts from time to time at our discretion.",
    "Notices under this agreement may be delivered by email to your registered address.",
];
