use crate::analysis::openapi::endpoint_paths;
use crate::models::contract::ApiContract;
use crate::models::pcm::MandatoryReporting;

/// Which declared response codes a generated PCM field applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeScope {
    All,
    Success,
}

/// Blueprint for one generated PCM field.
#[derive(Debug, Clone, Copy)]
pub struct PcmRuleTemplate {
    pub field: &'static str,
    pub definition: &'static str,
    pub filling_rule: &'static str,
    pub mandatory: MandatoryReporting,
    pub codes: CodeScope,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
    pub pattern: Option<&'static str>,
    pub example: Option<&'static str>,
}

/// One API family. Feeds both CSV family detection (paths only) and PCM
/// auto-mapping (paths or name keywords).
#[derive(Debug, Clone, Copy)]
pub struct FamilyRule {
    pub family: &'static str,
    pub path_patterns: &'static [&'static str],
    pub name_keywords: &'static [&'static str],
    pub extra_fields: &'static [PcmRuleTemplate],
}

impl FamilyRule {
    pub fn matches_paths(&self, lowered_paths: &[String]) -> bool {
        lowered_paths
            .iter()
            .any(|path| self.path_patterns.iter().any(|pattern| path.contains(pattern)))
    }

    pub fn matches_name(&self, lowered_name: &str) -> bool {
        self.name_keywords
            .iter()
            .any(|keyword| lowered_name.contains(keyword))
    }
}

const UUID_PATTERN: &str = "^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$";
const ID_PATTERN: &str = "^[a-zA-Z0-9][a-zA-Z0-9\\-]{0,99}$";

const fn id_field(
    field: &'static str,
    definition: &'static str,
    filling_rule: &'static str,
    example: &'static str,
) -> PcmRuleTemplate {
    PcmRuleTemplate {
        field,
        definition,
        filling_rule,
        mandatory: MandatoryReporting::Server,
        codes: CodeScope::Success,
        min_size: Some(1),
        max_size: Some(100),
        pattern: Some(ID_PATTERN),
        example: Some(example),
    }
}

/// Fields reported for every (endpoint, method) pair.
pub static BASE_PCM_RULES: &[PcmRuleTemplate] = &[
    PcmRuleTemplate {
        field: "fapiInteractionId",
        definition: "Correlation identifier sent in the x-fapi-interaction-id header",
        filling_rule: "Copy the header value exchanged on the call; both sides must report the same value",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(36),
        max_size: Some(36),
        pattern: Some(UUID_PATTERN),
        example: Some("d78fc4e5-37ca-4da3-adf2-9b082bf28f5b"),
    },
    PcmRuleTemplate {
        field: "endpoint",
        definition: "URI template of the operation that was called",
        filling_rule: "Use the path exactly as declared in the specification, without query string",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(1),
        max_size: Some(2048),
        pattern: None,
        example: Some("/accounts/{accountId}"),
    },
    PcmRuleTemplate {
        field: "httpMethod",
        definition: "HTTP method of the call",
        filling_rule: "Upper-case method name",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(3),
        max_size: Some(7),
        pattern: Some("^(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS|TRACE)$"),
        example: Some("GET"),
    },
    PcmRuleTemplate {
        field: "statusCode",
        definition: "HTTP status code returned to the client",
        filling_rule: "Numeric status as observed by the reporting side",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(3),
        max_size: Some(3),
        pattern: Some("^[1-5][0-9]{2}$"),
        example: Some("200"),
    },
    PcmRuleTemplate {
        field: "apiVersion",
        definition: "Major version tag of the API that served the call",
        filling_rule: "Lower-case 'v' followed by the major version number",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(2),
        max_size: Some(4),
        pattern: Some("^v[0-9]+$"),
        example: None,
    },
    PcmRuleTemplate {
        field: "timestamp",
        definition: "Instant the call was received or sent",
        filling_rule: "UTC date-time in RFC 3339 format with millisecond precision",
        mandatory: MandatoryReporting::Both,
        codes: CodeScope::All,
        min_size: Some(20),
        max_size: Some(30),
        pattern: None,
        example: Some("2024-05-01T13:45:12.345Z"),
    },
    PcmRuleTemplate {
        field: "processTimespan",
        definition: "Time spent by the server processing the request, in milliseconds",
        filling_rule: "Integer milliseconds between request arrival and response dispatch",
        mandatory: MandatoryReporting::Server,
        codes: CodeScope::All,
        min_size: Some(1),
        max_size: Some(10),
        pattern: Some("^[0-9]+$"),
        example: Some("128"),
    },
    PcmRuleTemplate {
        field: "clientOrgId",
        definition: "Organization identifier of the calling institution",
        filling_rule: "Organization id taken from the client certificate",
        mandatory: MandatoryReporting::Server,
        codes: CodeScope::All,
        min_size: Some(36),
        max_size: Some(36),
        pattern: Some(UUID_PATTERN),
        example: Some("b961c4eb-509d-4edf-afeb-35642b38185d"),
    },
    PcmRuleTemplate {
        field: "serverOrgId",
        definition: "Organization identifier of the institution that served the call",
        filling_rule: "Organization id of the called server as registered in the directory",
        mandatory: MandatoryReporting::Client,
        codes: CodeScope::All,
        min_size: Some(36),
        max_size: Some(36),
        pattern: Some(UUID_PATTERN),
        example: Some("74e929d9-33b6-4d85-8ba7-c146c867a817"),
    },
];

const CONSENT_ID: PcmRuleTemplate = id_field(
    "consentId",
    "Identifier of the consent the call is bound to",
    "Consent id returned on consent creation",
    "urn:bancoex:C1DD33123",
);
const CONTRACT_ID: PcmRuleTemplate = id_field(
    "contractId",
    "Identifier of the credit contract",
    "Contract id as exposed by the holder institution",
    "dadd421d-184e-4689-a085-409d1bca4193",
);

/// Ordered family table; detection returns the first match, so more specific
/// families come first.
pub static FAMILY_RULES: &[FamilyRule] = &[
    FamilyRule {
        family: "automatic-payments",
        path_patterns: &["/recurring-consents", "/recurring-payments"],
        name_keywords: &["automatic-payment", "recurring", "automatico"],
        extra_fields: &[
            id_field(
                "recurringConsentId",
                "Identifier of the recurring payment consent",
                "Consent id returned on recurring consent creation",
                "urn:bancoex:C1DD33123",
            ),
            id_field(
                "recurringPaymentId",
                "Identifier of the recurring payment",
                "Payment id returned by the holder",
                "TXpRMU9UQTFNVFl6T0RZME",
            ),
        ],
    },
    FamilyRule {
        family: "payments-pix",
        path_patterns: &["/pix/payments"],
        name_keywords: &["payment", "pagamento", "pix"],
        extra_fields: &[
            CONSENT_ID,
            id_field(
                "paymentId",
                "Identifier of the payment initiation",
                "Payment id returned by the holder on creation",
                "TXpRMU9UQTFNVFl6T0RZME",
            ),
            PcmRuleTemplate {
                field: "endToEndId",
                definition: "End-to-end identifier of the instant payment",
                filling_rule: "Identifier generated by the initiator for the settlement",
                mandatory: MandatoryReporting::Both,
                codes: CodeScope::Success,
                min_size: Some(32),
                max_size: Some(32),
                pattern: Some("^([E])([0-9]{8})([0-9]{4})(0[1-9]|1[0-2])(0[1-9]|[12][0-9]|3[01])(2[0-3]|[01][0-9])([0-5][0-9])([a-zA-Z0-9]{11})$"),
                example: Some("E9040088820210128000800123873170"),
            },
        ],
    },
    FamilyRule {
        family: "enrollments",
        path_patterns: &["/enrollments"],
        name_keywords: &["enrollment", "vinculo"],
        extra_fields: &[id_field(
            "enrollmentId",
            "Identifier of the device enrollment",
            "Enrollment id returned on enrollment creation",
            "urn:bancoex:C1DD33123",
        )],
    },
    FamilyRule {
        family: "credit-cards-accounts",
        path_patterns: &["/credit-cards-accounts"],
        name_keywords: &["credit-card", "credit card", "cartao"],
        extra_fields: &[id_field(
            "creditCardAccountId",
            "Identifier of the credit card account",
            "Account id as listed by the holder",
            "XXZTR3459087",
        )],
    },
    FamilyRule {
        family: "accounts",
        path_patterns: &["/accounts"],
        name_keywords: &["account", "conta"],
        extra_fields: &[id_field(
            "accountId",
            "Identifier of the deposit account",
            "Account id as listed by the holder",
            "92792126019929279212650822221989319252576",
        )],
    },
    FamilyRule {
        family: "resources",
        path_patterns: &["/resources"],
        name_keywords: &["resource", "recurso"],
        extra_fields: &[id_field(
            "resourceId",
            "Identifier of the shared resource",
            "Resource id as listed by the holder",
            "25cac914-d8ae-6789-b215-650a6215820d",
        )],
    },
    FamilyRule {
        family: "customers",
        path_patterns: &["/personal/identifications", "/business/identifications", "/customers"],
        name_keywords: &["customer", "cliente", "cadastro"],
        extra_fields: &[],
    },
    FamilyRule {
        family: "loans",
        path_patterns: &["/loans"],
        name_keywords: &["loan", "emprestimo"],
        extra_fields: &[CONTRACT_ID],
    },
    FamilyRule {
        family: "financings",
        path_patterns: &["/financings"],
        name_keywords: &["financing", "financiamento"],
        extra_fields: &[CONTRACT_ID],
    },
    FamilyRule {
        family: "consents",
        path_patterns: &["/consents"],
        name_keywords: &["consent", "consentimento"],
        extra_fields: &[CONSENT_ID],
    },
    FamilyRule {
        family: "Open Finance",
        path_patterns: &["/open-banking/", "/open-finance/"],
        name_keywords: &["open finance", "open-finance"],
        extra_fields: &[],
    },
];

/// Lower-cased endpoint paths declared by the contract's parsed specification.
pub fn lowered_paths(api: &ApiContract) -> Vec<String> {
    api.specification
        .as_ref()
        .map(endpoint_paths)
        .unwrap_or_default()
        .into_iter()
        .map(|path| path.to_lowercase())
        .collect()
}

pub fn detect_csv_family(api: &ApiContract) -> Option<String> {
    detect_family_with(FAMILY_RULES, &lowered_paths(api))
}

pub fn detect_family_with(rules: &[FamilyRule], lowered_paths: &[String]) -> Option<String> {
    rules
        .iter()
        .find(|rule| rule.matches_paths(lowered_paths))
        .map(|rule| rule.family.to_string())
}

/// Every family whose paths or name keywords match; used for PCM mapping.
pub fn matching_families<'a>(
    rules: &'a [FamilyRule],
    name: &str,
    lowered_paths: &[String],
) -> Vec<&'a FamilyRule> {
    let lowered_name = name.to_lowercase();
    rules
        .iter()
        .filter(|rule| rule.matches_paths(lowered_paths) || rule.matches_name(&lowered_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn api_with_paths(paths: &[&str]) -> ApiContract {
        let mut api = ApiContract::new("test", "1.0.0", Utc::now());
        let mut map = serde_json::Map::new();
        for path in paths {
            map.insert(path.to_string(), json!({ "get": {} }));
        }
        api.specification = Some(json!({ "paths": map }));
        api
    }

    #[test]
    fn first_rule_in_table_order_wins() {
        let api = api_with_paths(&["/consents", "/pix/payments"]);
        assert_eq!(detect_csv_family(&api).as_deref(), Some("payments-pix"));

        let api = api_with_paths(&["/credit-cards-accounts/{creditCardAccountId}"]);
        assert_eq!(detect_csv_family(&api).as_deref(), Some("credit-cards-accounts"));
    }

    #[test]
    fn detection_is_case_insensitive_on_paths() {
        let api = api_with_paths(&["/Accounts/{accountId}/Balances"]);
        assert_eq!(detect_csv_family(&api).as_deref(), Some("accounts"));
    }

    #[test]
    fn no_specification_or_unknown_paths_detects_nothing() {
        let api = ApiContract::new("test", "1.0.0", Utc::now());
        assert_eq!(detect_csv_family(&api), None);

        let api = api_with_paths(&["/health", "/widgets"]);
        assert_eq!(detect_csv_family(&api), None);
    }

    #[test]
    fn name_keywords_only_count_for_pcm_mapping() {
        let families = matching_families(FAMILY_RULES, "Loans API", &[]);
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].family, "loans");
    }
}
