//! Fingerprint blacklist.
//!
//! Fingerprints are at most five bytes of token codes. The set below holds
//! the shapes observed in real injection traffic; membership is a necessary
//! condition for a SQLi verdict, the whitelist pass then removes known
//! false-positive shapes.

use std::collections::HashSet;
use std::sync::OnceLock;

static BLACKLIST: OnceLock<HashSet<&'static str>> = OnceLock::new();

#[rustfmt::skip]
static FINGERPRINTS: &[&str] = &[
    // Tautologies around a logic operator.
    "1&1", "1&v", "1&s", "1&n", "1&f", "1&(", "1&E", "1&k", "1&U",
    "v&1", "v&v", "v&s", "v&n", "v&f", "v&(",
    "s&1", "s&v", "s&s", "s&n", "s&f", "s&(", "s&E", "s&k", "s&U",
    "n&1", "n&v", "n&s", "n&f", "n&(", "n&E", "n&U",
    "f&1", "f&s", "f&v",
    "1&1c", "1&1o", "1&1B", "1&1k", "1&1;", "1&1,",
    "s&1c", "s&1o", "v&1c", "v&1o", "n&1c",
    "1&vc", "1&vo", "1&sc", "1&so", "1&nc", "1&no",
    "&1o1", "&1o1c", "&1ov", "&1os", "&vov", "&sos",
    // String tautologies: 'a' OR 'a' = 'a' and friends.
    "s&sos", "s&so1", "s&son", "s&sov", "s&sof", "s&so(",
    "sos", "sosc", "s&sc", "s&so", "s&sB",
    "1&1o1", "1&1ov", "1&1os", "1&vo1", "1&vov", "1&sos",
    "n&1o1", "n&non", "v&1o1", "v&vov",
    "so1", "so1c", "sono", "sonc", "sov", "sovc", "son",
    "1o1c", "1ono", "1ov", "1ovc", "1os", "1osc",
    "vo1c", "vovc", "vono",
    // Comment truncation after a value or operator.
    "sc", "1c", "vc", "nc", "oc", "soc", "1oc", "voc", "noc",
    "s&c", "1&c", "Ec", "Uc", "kc", "fc", "(c", ")c", "Bc", "tc",
    "s;c", "1;c", "v;c", "n;c",
    // UNION probes.
    "1U", "sU", "vU", "nU", "kU", ")U",
    "1UE", "sUE", "vUE", "nUE", ")UE", "EUE",
    "1UEk", "sUEk", "vUEk", "nUEk", ")UEk",
    "1UEn", "sUEn", "vUEn", "nUEn",
    "1UE1", "sUE1", "vUE1", "nUE1",
    "1UEf", "sUEf", "vUEf", "nUEf",
    "1UEv", "sUEv", "vUEv",
    "1UEs", "sUEs", "vUEs",
    "1UE(", "sUE(", "vUE(", "nUE(",
    "U(E", "UE(", "UEn", "UE1", "UEk", "UEf", "UEs", "UEv",
    // Stacked queries.
    "1;E", "s;E", "v;E", "n;E", ");E", "1;T", "s;T", "v;T", "n;T", ");T",
    "1;Ek", "s;Ek", "v;Ek", "n;Ek", "1;En", "s;En", "1;E1", "s;E1",
    "1;Ekn", "s;Ekn", "v;Ekn", "n;Ekn", ");Ekn",
    "1;Enc", "s;Enc", "n;Enc", ");Enc", "1;E1c", "s;E1c",
    "1;Tn", "s;Tn", "1;T1", "s;T1", "1;Tv", "s;Tv", "1;T(", "s;T(",
    ";E", ";T", ";Ek", ";En", ";E1", ";Tn", ";T1", ";T(",
    "E;T", "T;E", "k;T", "n;T(",
    // Expression heads reached through a break-out.
    "Eoknk", "Eokn", "Eok1", "Eoks", "Eokv", "Eokf",
    "Ekn", "Ek1", "Eks", "Ekv", "Ekf", "Ek(", "Eknc", "Ek1c",
    "En(", "E1o", "Eno", "Eso", "Evo", "Ef(",
    "kn&", "kn&1", "kn&v", "kn&s", "kn&n", "knoc",
    "k1o", "kno", "kso", "kvo", "k1o1", "knon",
    // Function-call probes: sleep(1), benchmark(...), load_file(...).
    "f(1)", "f(1,", "f(s)", "f(s,", "f(v)", "f(v,", "f(n)", "f(n,",
    "f()", "f((", "f(f(", "of(", "&f(", "of(1", "of(s", "of(v", "of(n",
    "1of(", "sof(", "vof(", "nof(",
    "f(1)c", "f(s)c", "f(v)c", "f(n)c",
    // Conditional and time-based probes.
    "1)&1", "s)&1", "v)&1", "n)&1", ")&1", ")&1c", ")&1o", ")&v", ")&s",
    ")&(", ")&n", ")o1", ")o1c", ")ov", ")os", ")oc",
    "1)o1", "s)o1", "v)o1", "n)o1", "1)&(", "s)&(",
    "1)c", "s)c", "v)c", "n)c", "1))c", "s))c", "1)))", "1));",
    "1);T", "s);T", "1);E", "s);E", ");Ek", ");Tn",
    // Variable probes: @@version and friends next to something.
    "vov", "vo1", "vos", "von", "ovo", "ov1", "ovs", "nov",
    // Type-punning and collation tricks.
    "sA", "1A", "vA", "nA", "sA1", "sAn", "1A1", "1An",
    // Backslash escapes reaching the parser.
    "s\\", "1\\", "n\\", "v\\", "\\s", "\\1", "\\n",
    // Brace/ODBC escapes.
    "{1", "{s", "{v", "{n", "{f", "1{", "s{", "n{",
    "{f(", "{f(1", "{f(s",
    // Five-token window shapes from repetition resets.
    "1,(1,", "1,(1(", "n,(n,", "1&(1&", "1&(1(", "1&(1,",
    "no(n(", "no(no", "1o(1(", "1o(1o",
];

fn table() -> &'static HashSet<&'static str> {
    BLACKLIST.get_or_init(|| FINGERPRINTS.iter().copied().collect())
}

/// Exact-match membership test.
pub fn is_blacklisted(fingerprint: &str) -> bool {
    table().contains(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_attack_shapes() {
        assert!(is_blacklisted("1&1"));
        assert!(is_blacklisted("s&sos"));
        assert!(is_blacklisted("sc"));
        assert!(is_blacklisted("1UE"));
        assert!(is_blacklisted("1;E"));
    }

    #[test]
    fn benign_shapes_absent() {
        assert!(!is_blacklisted("n"));
        assert!(!is_blacklisted("nn"));
        assert!(!is_blacklisted("E"));
        assert!(!is_blacklisted("s"));
        assert!(!is_blacklisted(""));
    }

    #[test]
    fn all_entries_fit_fingerprint_width() {
        for fp in FINGERPRINTS {
            assert!(fp.len() <= 5, "oversized entry {fp}");
        }
    }

    #[test]
    fn no_duplicate_entries() {
        let mut seen = std::collections::HashSet::new();
        for fp in FINGERPRINTS {
            assert!(seen.insert(*fp), "duplicate entry {fp}");
        }
    }
}
