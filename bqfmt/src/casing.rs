//! Case normalization of keywords, built-in functions and pseudo columns.

use bqfmt_lang::token::RESERVED_KEYWORDS;

use crate::config::FormatOptions;

/// Functions callable without a namespace.
pub const GLOBAL_FUNCTIONS: &[&str] = &[
    "DETERMINISTIC_DECRYPT_BYTES",
    "DETERMINISTIC_DECRYPT_STRING",
    "DETERMINISTIC_ENCRYPT",
    "ANY_VALUE",
    "ARRAY_AGG",
    "ARRAY_CONCAT_AGG",
    "AVG",
    "BIT_AND",
    "BIT_OR",
    "BIT_XOR",
    "COUNT",
    "COUNTIF",
    "GROUPING",
    "LOGICAL_AND",
    "LOGICAL_OR",
    "MAX",
    "MAX_BY",
    "MIN",
    "MIN_BY",
    "STRING_AGG",
    "SUM",
    "CORR",
    "COVAR_POP",
    "COVAR_SAMP",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "STDDEV",
    "VAR_POP",
    "VAR_SAMP",
    "VARIANCE",
    "APPROX_COUNT_DISTINCT",
    "APPROX_QUANTILES",
    "APPROX_TOP_COUNT",
    "APPROX_TOP_SUM",
    "DLP_DETERMINISTIC_ENCRYPT",
    "DLP_DETERMINISTIC_DECRYPT",
    "DLP_KEY_CHAIN",
    "RANK",
    "DENSE_RANK",
    "PERCENT_RANK",
    "CUME_DIST",
    "NTILE",
    "ROW_NUMBER",
    "SEARCH",
    "VECTOR_SEARCH",
    "BIT_COUNT",
    "EXTERNAL_OBJECT_TRANSFORM",
    "CAST",
    "PARSE_BIGNUMERIC",
    "PARSE_NUMERIC",
    "SAFE_CAST",
    "ABS",
    "SIGN",
    "IS_INF",
    "IS_NAN",
    "IEEE_DIVIDE",
    "RAND",
    "SQRT",
    "POW",
    "POWER",
    "EXP",
    "EUCLIDEAN_DISTANCE",
    "LN",
    "LOG",
    "LOG10",
    "GREATEST",
    "LEAST",
    "DIV",
    "SAFE_DIVIDE",
    "SAFE_MULTIPLY",
    "SAFE_NEGATE",
    "SAFE_ADD",
    "SAFE_SUBTRACT",
    "MOD",
    "ROUND",
    "TRUNC",
    "CEIL",
    "CEILING",
    "FLOOR",
    "COS",
    "COSH",
    "COSIGN_DISTANCE",
    "ACOS",
    "ACOSH",
    "COT",
    "COTH",
    "CSC",
    "CSCH",
    "SEC",
    "SECH",
    "SIN",
    "SINH",
    "ASIN",
    "ASINH",
    "TAN",
    "TANH",
    "ATAN",
    "ATANH",
    "ATAN2",
    "CBRT",
    "RANGE_BUCKET",
    "FIRST_VALUE",
    "LAST_VALUE",
    "NTH_VALUE",
    "LEAD",
    "LAG",
    "PERCENTILE_CONT",
    "PERCENTILE_DISC",
    "FARM_FINGERPRINT",
    "MD5",
    "SHA1",
    "SHA256",
    "SHA512",
    "ASCII",
    "BYTE_LENGTH",
    "CHAR_LENGTH",
    "CHARACTER_LENGTH",
    "CHR",
    "CODE_POINTS_TO_BYTES",
    "CODE_POINTS_TO_STRING",
    "COLLATE",
    "CONCAT",
    "CONTAINS_SUBSTR",
    "EDIT_DISTANCE",
    "ENDS_WITH",
    "FORMAT",
    "FROM_BASE32",
    "FROM_BASE64",
    "FROM_HEX",
    "INITCAP",
    "INSTR",
    "LEFT",
    "LENGTH",
    "LPAD",
    "LOWER",
    "LTRIM",
    "NORMALIZE",
    "NORMALIZE_AND_CASEFOLD",
    "OCTET_LENGTH",
    "REGEXP_CONTAINS",
    "REGEXP_EXTRACT",
    "REGEXP_EXTRACT_ALL",
    "REGEXP_INSTR",
    "REGEXP_REPLACE",
    "REGEXP_SUBSTR",
    "REPLACE",
    "REPEAT",
    "REVERSE",
    "RIGHT",
    "RPAD",
    "RTRIM",
    "SAFE_CONVERT_BYTES_TO_STRING",
    "SOUNDEX",
    "SPLIT",
    "STARTS_WITH",
    "STRPOS",
    "SUBSTR",
    "SUBSTRING",
    "TO_BASE32",
    "TO_BASE64",
    "TO_CODE_POINTS",
    "TO_HEX",
    "TRANSLATE",
    "TRIM",
    "UNICODE",
    "UPPER",
    "BOOL",
    "FLOAT64",
    "INT64",
    "JSON_ARRAY",
    "JSON_ARRAY_APPEND",
    "JSON_ARRAY_INSERT",
    "JSON_EXTRACT",
    "JSON_EXTRACT_ARRAY",
    "JSON_EXTRACT_SCALAR",
    "JSON_EXTRACT_STRING_ARRAY",
    "JSON_OBJECT",
    "JSON_QUERY",
    "JSON_QUERY_ARRAY",
    "JSON_REMOVE",
    "JSON_SET",
    "JSON_STRIP_NULLS",
    "JSON_TYPE",
    "JSON_VALUE",
    "JSON_VALUE_ARRAY",
    "LAX_BOOL",
    "LAX_FLOAT64",
    "LAX_INT64",
    "LAX_STRING",
    "PARSE_JSON",
    "STRING",
    "TO_JSON",
    "TO_JSON_STRING",
    "ARRAY",
    "ARRAY_CONCAT",
    "ARRAY_LENGTH",
    "ARRAY_TO_STRING",
    "GENERATE_ARRAY",
    "GENERATE_DATE_ARRAY",
    "GENERATE_TIMESTAMP_ARRAY",
    "OFFSET",
    "ORDINAL",
    "ARRAY_REVERSE",
    "SAFE_OFFSET",
    "SAFE_ORDINAL",
    "CURRENT_DATE",
    "EXTRACT",
    "DATE",
    "DATE_ADD",
    "DATE_SUB",
    "DATE_DIFF",
    "DATE_TRUNC",
    "DATE_FROM_UNIX_DATE",
    "FORMAT_DATE",
    "LAST_DAY",
    "PARSE_DATE",
    "UNIX_DATE",
    "CURRENT_DATETIME",
    "DATETIME",
    "DATETIME_ADD",
    "DATETIME_SUB",
    "DATETIME_DIFF",
    "DATETIME_TRUNC",
    "FORMAT_DATETIME",
    "PARSE_DATETIME",
    "CURRENT_TIME",
    "TIME",
    "TIME_ADD",
    "TIME_SUB",
    "TIME_DIFF",
    "TIME_TRUNC",
    "FORMAT_TIME",
    "PARSE_TIME",
    "BAG_OF_WORDS",
    "TEXT_ANALYZE",
    "TF_IDF",
    "CURRENT_TIMESTAMP",
    "TIMESTAMP",
    "TIMESTAMP_ADD",
    "TIMESTAMP_SUB",
    "TIMESTAMP_DIFF",
    "TIMESTAMP_TRUNC",
    "FORMAT_TIMESTAMP",
    "PARSE_TIMESTAMP",
    "TIMESTAMP_SECONDS",
    "TIMESTAMP_MILLIS",
    "TIMESTAMP_MICROS",
    "UNIX_SECONDS",
    "UNIX_MILLIS",
    "UNIX_MICROS",
    "MAKE_INTERVAL",
    "JUSTIFY_DAYS",
    "JUSTIFY_HOURS",
    "JUSTIFY_INTERVAL",
    "S2_COVERINGCELLIDS",
    "S2_CELLIDFROMPOINT",
    "ST_ANGLE",
    "ST_AREA",
    "ST_ASBINARY",
    "ST_ASGEOJSON",
    "ST_ASTEXT",
    "ST_AZIMUTH",
    "ST_BOUNDARY",
    "ST_BOUNDINGBOX",
    "ST_BUFFER",
    "ST_BUFFERWITHTOLERANCE",
    "ST_CENTROID",
    "ST_CENTROID_AGG",
    "ST_CLOSESTPOINT",
    "ST_CLUSTERDBSCAN",
    "ST_CONTAINS",
    "ST_CONVEXHULL",
    "ST_COVEREDBY",
    "ST_COVERS",
    "ST_DIFFERENCE",
    "ST_DIMENSION",
    "ST_DISJOINT",
    "ST_DISTANCE",
    "ST_DUMP",
    "ST_DWITHIN",
    "ST_ENDPOINT",
    "ST_EXTENT",
    "ST_EXTERIORRING",
    "ST_EQUALS",
    "ST_GEOGFROM",
    "ST_GEOGFROMGEOJSON",
    "ST_GEOGFROMTEXT",
    "ST_GEOGFROMWKB",
    "ST_GEOGPOINT",
    "ST_GEOGPOINTFROMGEOHASH",
    "ST_GEOHASH",
    "ST_GEOMETRYTYPE",
    "ST_HAUSDORFFDISTANCE",
    "ST_INTERIORRINGS",
    "ST_INTERSECTION",
    "ST_INTERSECTS",
    "ST_INTERSECTSBOX",
    "ST_ISCLOSED",
    "ST_ISCOLLECTION",
    "ST_ISEMPTY",
    "ST_ISRING",
    "ST_LENGTH",
    "ST_LINESUBSTRING",
    "ST_LINEINTERPOLATEPOINT",
    "ST_MAKELINE",
    "ST_MAKEPOLYGON",
    "ST_MAKEPOLYGONORIENTED",
    "ST_MAXDISTANCE",
    "ST_NPOINTS",
    "ST_NUMGEOMETRIES",
    "ST_NUMPOINTS",
    "ST_PERIMETER",
    "ST_POINTN",
    "ST_SIMPLIFY",
    "ST_SNAPTOGRID",
    "ST_STARTPOINT",
    "ST_TOUCHES",
    "ST_UNION",
    "ST_UNION_AGG",
    "ST_WITHIN",
    "ST_X",
    "ST_Y",
    "SESSION_USER",
    "GENERATE_UUID",
    "COALESCE",
    "IF",
    "IFNULL",
    "NULLIF",
    "ERROR",
    "EXTERNAL_QUERY",
];

/// Functions under `KEYS.`.
pub const KEYS_FUNCTIONS: &[&str] = &[
    "NEW_KEYSET",
    "NEW_WRAPPED_KEYSET",
    "REWRAP_KEYSET",
    "ADD_KEY_FROM_RAW_BYTES",
    "KEYSET_CHAIN",
    "KEYSET_FROM_JSON",
    "KEYSET_TO_JSON",
    "ROTATE_KEYSET",
    "ROTATE_WRAPPED_KEYSET",
    "KEYSET_LENGTH",
];

/// Functions under `AEAD.`.
pub const AEAD_FUNCTIONS: &[&str] = &[
    "DECRYPT_BYTES",
    "DECRYPT_STRING",
    "ENCRYPT",
];

/// Functions under `HLL_COUNT.`.
pub const HLL_COUNT_FUNCTIONS: &[&str] = &[
    "INIT",
    "MERGE",
    "MERGE_PARTIAL",
    "EXTRACT",
];

/// Functions under `NET.`.
pub const NET_FUNCTIONS: &[&str] = &[
    "IP_FROM_STRING",
    "SAFE_IP_FROM_STRING",
    "IP_TO_STRING",
    "IP_NET_MASK",
    "IP_TRUNC",
    "IPV4_FROM_INT64",
    "IPV4_TO_INT64",
    "HOST",
    "PUBLIC_SUFFIX",
    "REG_DOMAIN",
];

/// Functions under `ML.`.
pub const ML_FUNCTIONS: &[&str] = &[
    "TRANSFORM",
    "FEATURE_INFO",
    "IMPUTER",
    "BUCKETIZE",
    "MAX_ABS_SCALER",
    "MIN_MAX_SCALER",
    "NORMALIZER",
    "POLYNOMIAL_EXPAND",
    "QUANTILE_BUCKETIZE",
    "ROBUST_SCALER",
    "STANDARD_SCALER",
    "FEATURE_CROSS",
    "HASH_BUCKETIZE",
    "LABEL_ENCODER",
    "MULTI_HOT_ENCODER",
    "ONE_HOT_ENCODER",
    "NGRAMS",
    "BAG_OF_WORDS",
    "TF_IDF",
    "CONVERT_COLOR_SPACE",
    "CONVERT_IMAGE_TYPE",
    "DECODE_IMAGE",
    "RESIZE_IMAGE",
    "FEATURES_AT_TIME",
    "ENTITY_FEATURES_AT_TIME",
    "TRIAL_INFO",
    "EVALUATE",
    "ROC_CURVE",
    "CONFUSION_MATRIX",
    "ARIMA_EVALUATE",
    "TRAINING_INFO",
    "RECONSTRUCTION_LOSS",
    "HOLIDAY_INFO",
    "PREDICT",
    "FORECAST",
    "RECOMMEND",
    "DETECT_ANOMALIES",
    "GENERATE_TEXT",
    "GENERATE_TEXT_EMBEDDING",
    "UNDERSTAND_TEXT",
    "TRANSLATE",
    "PROCESS_DOCUMENT",
    "TRANSCRIBE",
    "ANNOTATE_IMAGE",
    "ARIMA_COEFFICIENTS",
    "EXPLAIN_FORECAST",
    "GLOBAL_EXPLAIN",
    "FEATURE_IMPORTANCE",
    "ADVANCED_WEIGHTS",
    "WEIGHTS",
    "CENTROIDS",
    "PRINCIPAL_COMPONENTS",
    "PRINCIPAL_COMPONENT_INFO",
    "DISTANCE",
    "LP_NORM",
];

pub const PSEUDO_COLUMNS: &[&str] = &[
    "_PARTITIONTIME",
    "_PARTITIONDATE",
    "_TABLE_SUFFIX",
    "_FILE_NAME",
];

/// Functions whose last argument is a date part (`DATE_ADD(d, INTERVAL 1 DAY)`,
/// `DATE_TRUNC(d, MONTH)`).
pub const DATE_PART_FUNCTIONS: &[&str] = &[
    "DATE_ADD",
    "DATE_SUB",
    "DATE_DIFF",
    "DATE_TRUNC",
    "DATETIME_ADD",
    "DATETIME_SUB",
    "DATETIME_DIFF",
    "DATETIME_TRUNC",
    "TIME_ADD",
    "TIME_SUB",
    "TIME_DIFF",
    "TIME_TRUNC",
    "TIMESTAMP_ADD",
    "TIMESTAMP_SUB",
    "TIMESTAMP_DIFF",
    "TIMESTAMP_TRUNC",
    "LAST_DAY",
];

/// Namespace a called function name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionTable {
    #[default]
    Global,
    Keys,
    Aead,
    HllCount,
    Net,
    Ml,
}

impl FunctionTable {
    /// The table selected by a namespace prefix, e.g. `NET` in `NET.HOST(x)`. `SAFE.`
    /// wraps global functions.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let table = match prefix.to_uppercase().as_str() {
            "SAFE" => Self::Global,
            "KEYS" => Self::Keys,
            "AEAD" => Self::Aead,
            "HLL_COUNT" => Self::HllCount,
            "NET" => Self::Net,
            "ML" => Self::Ml,
            _ => return None,
        };
        Some(table)
    }

    fn functions(self) -> &'static [&'static str] {
        match self {
            Self::Global => GLOBAL_FUNCTIONS,
            Self::Keys => KEYS_FUNCTIONS,
            Self::Aead => AEAD_FUNCTIONS,
            Self::HllCount => HLL_COUNT_FUNCTIONS,
            Self::Net => NET_FUNCTIONS,
            Self::Ml => ML_FUNCTIONS,
        }
    }

    pub fn contains(self, name: &str) -> bool {
        contains(self.functions(), name)
    }
}

fn contains(table: &[&str], literal: &str) -> bool {
    table.iter().any(|t| t.eq_ignore_ascii_case(literal))
}

pub fn is_reserved_keyword(literal: &str) -> bool {
    contains(RESERVED_KEYWORDS, literal)
}

pub fn is_pseudo_column(literal: &str) -> bool {
    contains(PSEUDO_COLUMNS, literal)
}

pub fn is_date_part_function(literal: &str) -> bool {
    contains(DATE_PART_FUNCTIONS, literal)
}

/// Upper-cases a keyword when keyword casing is enabled.
pub fn keyword(literal: &str, options: &FormatOptions) -> String {
    if options.print_keywords_in_upper_case {
        literal.to_uppercase()
    } else {
        literal.to_string()
    }
}

/// Numeric literals are verbatim except for the exponent marker. Hex literals are
/// left alone since `E` is a digit there.
pub fn numeric(literal: &str) -> String {
    let lower = literal.to_ascii_lowercase();
    if lower.starts_with("0x") {
        literal.to_string()
    } else {
        literal.replace('E', "e")
    }
}

/// Casing of an identifier. `callable` is the table to look the name up in when the
/// identifier is the name of a called function.
pub fn identifier(literal: &str, callable: Option<FunctionTable>, options: &FormatOptions) -> String {
    if literal.starts_with('`') {
        return literal.to_string();
    }
    let upper = if is_reserved_keyword(literal) {
        options.print_keywords_in_upper_case
    } else if let Some(table) = callable {
        options.print_keywords_in_upper_case && table.contains(literal)
    } else {
        return pseudo_column(literal, options);
    };
    if upper {
        literal.to_uppercase()
    } else {
        literal.to_string()
    }
}

/// Casing of an identifier that can only be a column, such as a field after `.`.
pub fn pseudo_column(literal: &str, options: &FormatOptions) -> String {
    if options.print_pseudo_columns_in_upper_case && is_pseudo_column(literal) {
        literal.to_uppercase()
    } else {
        literal.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_tables() {
        assert!(FunctionTable::Global.contains("count"));
        assert!(FunctionTable::Global.contains("ARRAY_AGG"));
        assert!(!FunctionTable::Global.contains("my_udf"));
        assert!(FunctionTable::Net.contains("host"));
        assert!(!FunctionTable::Global.contains("host"));
        assert_eq!(FunctionTable::from_prefix("safe"), Some(FunctionTable::Global));
        assert_eq!(FunctionTable::from_prefix("hll_count"), Some(FunctionTable::HllCount));
        assert_eq!(FunctionTable::from_prefix("dataset"), None);
    }

    #[test]
    fn test_identifier_casing() {
        let options = FormatOptions::default();
        assert_eq!(identifier("sum", Some(FunctionTable::Global), &options), "SUM");
        assert_eq!(identifier("sum", None, &options), "sum");
        assert_eq!(identifier("my_udf", Some(FunctionTable::Global), &options), "my_udf");
        assert_eq!(identifier("`if`", Some(FunctionTable::Global), &options), "`if`");
        assert_eq!(identifier("_partitiontime", None, &options), "_PARTITIONTIME");
        assert_eq!(identifier("range", None, &options), "RANGE");
        assert_eq!(pseudo_column("range", &options), "range");
        assert_eq!(pseudo_column("_table_suffix", &options), "_TABLE_SUFFIX");
        let keep = FormatOptions {
            print_keywords_in_upper_case: false,
            print_pseudo_columns_in_upper_case: false,
            ..FormatOptions::default()
        };
        assert_eq!(identifier("sum", Some(FunctionTable::Global), &keep), "sum");
        assert_eq!(identifier("_partitiontime", None, &keep), "_partitiontime");
        assert_eq!(keyword("select", &keep), "select");
        assert_eq!(keyword("select", &options), "SELECT");
    }

    #[test]
    fn test_numeric_casing() {
        assert_eq!(numeric("1.5E-3"), "1.5e-3");
        assert_eq!(numeric("0xFE"), "0xFE");
        assert_eq!(numeric("42"), "42");
    }
}
