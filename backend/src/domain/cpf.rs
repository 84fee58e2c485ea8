//! CPF validation.
//!
//! A CPF is the Brazilian natural-person tax id: eleven digits where the
//! last two are check digits derived from the preceding ones. The validator
//! ignores formatting characters, so `529.982.247-25` and `52998224725`
//! are the same identity. That normalized digit string is also the key used
//! for client deduplication and merging.

/// Strip everything that is not an ASCII digit.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Validate a CPF by its check digits.
///
/// Formatting is ignored. Eleven repeated digits (e.g. `111.111.111-11`)
/// pass the arithmetic but are rejected as known-invalid documents.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits = digits_only(cpf);
    if digits.len() != 11 {
        return false;
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if d.windows(2).all(|pair| pair[0] == pair[1]) {
        return false;
    }

    check_digit(&d[..9]) == d[9] && check_digit(&d[..10]) == d[10]
}

/// Check digit over a prefix: weighted sum with weights counting down to 2,
/// times ten, mod eleven, where a remainder of ten collapses to zero.
fn check_digit(prefix: &[u32]) -> u32 {
    let weights = (2..=(prefix.len() as u32 + 1)).rev();
    let sum: u32 = prefix.iter().zip(weights).map(|(d, w)| d * w).sum();
    let rest = (sum * 10) % 11;
    if rest == 10 {
        0
    } else {
        rest
    }
}
