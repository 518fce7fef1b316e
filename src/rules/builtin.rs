//! Built-in detection rules
//!
//! Order matters: it is the evaluation order, and therefore the order issues
//! appear in within a single line.

use super::types::{Category, RuleSpec, Severity};

struct BuiltinRule {
    id: &'static str,
    pattern: &'static str,
    category: Category,
    severity: Severity,
    message: &'static str,
    recommendation: &'static str,
}

const BUILTIN_RULES: &[BuiltinRule] = &[
    // Secrets
    BuiltinRule {
        id: "secrets.openai-style-key",
        pattern: r"\bsk-(?:proj-|ant-)?[A-Za-z0-9_-]{20,}",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Hardcoded API secret key (sk-... format)",
        recommendation: "Revoke the key and load it from a secret manager or environment variable",
    },
    BuiltinRule {
        id: "secrets.aws-access-key",
        pattern: r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b",
        category: Category::Secrets,
        severity: Severity::High,
        message: "AWS access key id",
        recommendation: "Rotate the IAM credentials and use an instance role or credential provider",
    },
    BuiltinRule {
        id: "secrets.github-token",
        pattern: r"\b(?:gh[opsur]_[A-Za-z0-9]{36,}|github_pat_[A-Za-z0-9_]{22,})",
        category: Category::Secrets,
        severity: Severity::High,
        message: "GitHub access token",
        recommendation: "Revoke the token in GitHub settings and inject it at runtime",
    },
    BuiltinRule {
        id: "secrets.slack-token",
        pattern: r"\bxox[abposr]-[A-Za-z0-9-]{10,}",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Slack API token",
        recommendation: "Revoke the token and store it outside the repository",
    },
    BuiltinRule {
        id: "secrets.google-api-key",
        pattern: r"\bAIza[0-9A-Za-z_-]{35}",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Google API key",
        recommendation: "Restrict and regenerate the key; read it from configuration at runtime",
    },
    BuiltinRule {
        id: "secrets.stripe-live-key",
        pattern: r"\b[rs]k_live_[0-9A-Za-z]{24,}",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Stripe live API key",
        recommendation: "Roll the key in the Stripe dashboard and keep it in a vault",
    },
    BuiltinRule {
        id: "secrets.private-key",
        pattern: r"-----BEGIN (?:RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY(?: BLOCK)?-----",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Private key material committed to source",
        recommendation: "Remove the key from history and issue a new key pair",
    },
    BuiltinRule {
        id: "secrets.credentials-in-url",
        pattern: r"\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqp)://[^\s:/@]+:[^\s@/]+@",
        category: Category::Secrets,
        severity: Severity::High,
        message: "Connection string with embedded credentials",
        recommendation: "Move credentials into environment configuration",
    },
    BuiltinRule {
        id: "secrets.hardcoded-password",
        pattern: r#"(?i)\b(?:password|passwd|pwd)\s*[:=]\s*["'][^"'\s]{4,}["']"#,
        category: Category::Secrets,
        severity: Severity::Medium,
        message: "Hardcoded password literal",
        recommendation: "Read the password from a secret store or environment variable",
    },
    BuiltinRule {
        id: "secrets.jwt",
        pattern: r"\beyJ[A-Za-z0-9_-]{10,}\.eyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}",
        category: Category::Secrets,
        severity: Severity::Medium,
        message: "JSON Web Token literal",
        recommendation: "Do not commit issued tokens; generate them at runtime",
    },
    // PII
    BuiltinRule {
        id: "pii.us-ssn",
        pattern: r"\b\d{3}-\d{2}-\d{4}\b",
        category: Category::Pii,
        severity: Severity::High,
        message: "Possible US social security number",
        recommendation: "Remove personal data from source and fixtures",
    },
    BuiltinRule {
        id: "pii.credit-card",
        pattern: r"\b(?:4\d{3}|5[1-5]\d{2}|3[47]\d{2}|6011)[ -]?\d{4}[ -]?\d{4}[ -]?\d{1,4}\b",
        category: Category::Pii,
        severity: Severity::High,
        message: "Possible payment card number",
        recommendation: "Use documented test card numbers or tokenized values",
    },
    BuiltinRule {
        id: "pii.email",
        pattern: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        category: Category::Pii,
        severity: Severity::Low,
        message: "Email address",
        recommendation: "Confirm the address is not personal data; prefer example.com in fixtures",
    },
    BuiltinRule {
        id: "pii.phone-number",
        pattern: r"(?:\+1[ .-]?)?\(?\b\d{3}\)?[ .-]\d{3}[ .-]\d{4}\b",
        category: Category::Pii,
        severity: Severity::Low,
        message: "Possible phone number",
        recommendation: "Replace real phone numbers with placeholders",
    },
    // Insecure constructs
    BuiltinRule {
        id: "insecure.eval",
        pattern: r"\beval\s*\(",
        category: Category::Insecure,
        severity: Severity::High,
        message: "Dynamic code evaluation with eval()",
        recommendation: "Avoid eval; parse data explicitly or use a safe interpreter",
    },
    BuiltinRule {
        id: "insecure.shell-exec",
        pattern: r"\b(?:os\.system|os\.popen|child_process\.exec|execSync)\s*\(|shell\s*=\s*True",
        category: Category::Insecure,
        severity: Severity::High,
        message: "Command execution through a shell",
        recommendation: "Pass argument vectors without a shell and validate inputs",
    },
    BuiltinRule {
        id: "insecure.sql-concatenation",
        pattern: r#"(?i)\b(?:select|insert|update|delete)\b[^;\n]*["']\s*\+\s*[A-Za-z_]"#,
        category: Category::Insecure,
        severity: Severity::Medium,
        message: "SQL statement built by string concatenation",
        recommendation: "Use parameterized queries",
    },
    BuiltinRule {
        id: "insecure.unsafe-deserialization",
        pattern: r"\b(?:pickle\.loads?|yaml\.load|marshal\.loads)\s*\(",
        category: Category::Insecure,
        severity: Severity::Medium,
        message: "Deserialization of untrusted data",
        recommendation: "Use safe loaders such as yaml.safe_load or a schema-validated format",
    },
    BuiltinRule {
        id: "insecure.inner-html",
        pattern: r"\.innerHTML\s*=|dangerouslySetInnerHTML",
        category: Category::Insecure,
        severity: Severity::Medium,
        message: "Raw HTML injection sink",
        recommendation: "Render text content or sanitize HTML before insertion",
    },
    BuiltinRule {
        id: "insecure.tls-verification-disabled",
        pattern: r"\bverify\s*=\s*False\b|rejectUnauthorized\s*:\s*false|InsecureSkipVerify\s*:\s*true",
        category: Category::Insecure,
        severity: Severity::Medium,
        message: "TLS certificate verification disabled",
        recommendation: "Keep certificate verification on; trust a custom CA if needed",
    },
    BuiltinRule {
        id: "insecure.weak-hash",
        pattern: r"\b(?:hashlib\.)?(?:md5|sha1)\s*\(",
        category: Category::Insecure,
        severity: Severity::Low,
        message: "Weak hash function",
        recommendation: "Use SHA-256 or a dedicated password hash such as argon2",
    },
    BuiltinRule {
        id: "insecure.debug-enabled",
        pattern: r"\bDEBUG\s*=\s*(?:True|true|1)\b",
        category: Category::Insecure,
        severity: Severity::Low,
        message: "Debug mode enabled in configuration",
        recommendation: "Drive debug mode from environment configuration, off by default",
    },
    // Review markers
    BuiltinRule {
        id: "review.todo-marker",
        pattern: r"\b(?:TODO|FIXME|HACK|XXX)\b",
        category: Category::Review,
        severity: Severity::Low,
        message: "Review marker left in code",
        recommendation: "Track the follow-up in the issue tracker",
    },
    BuiltinRule {
        id: "review.security-suppression",
        pattern: r"(?i)#\s*nosec\b|//\s*nolint:gosec|@SuppressWarnings\(.security",
        category: Category::Review,
        severity: Severity::Low,
        message: "Security check suppressed inline",
        recommendation: "Confirm the suppression is justified and documented",
    },
];

/// Built-in rule definitions in evaluation order
pub fn builtin_rule_specs() -> Vec<RuleSpec> {
    BUILTIN_RULES
        .iter()
        .map(|rule| RuleSpec {
            id: rule.id.to_string(),
            pattern: rule.pattern.to_string(),
            category: rule.category,
            severity: rule.severity,
            message: rule.message.to_string(),
            recommendation: rule.recommendation.to_string(),
        })
        .collect()
}

/// Default path globs whose files are exempt from the `secrets` category
pub fn default_secret_store_globs() -> Vec<String> {
    [".env", ".env.*", "*.env", ".envrc"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
