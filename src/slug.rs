use chrono::{DateTime, Utc};
use uuid::Uuid;

/// to_slug
///
/// Lowercases `text` and collapses every run of characters outside `[a-z0-9]` into one hyphen,
/// trimming hyphens at both ends. `"Climate Tech!!"` becomes `"climate-tech"`.
///
/// The result may be empty when `text` has no ASCII alphanumerics; callers reject that case.
pub fn to_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// is_canonical_slug
///
/// True when `slug` is non-empty and already in `to_slug` form.
pub fn is_canonical_slug(slug: &str) -> bool {
    !slug.is_empty() && to_slug(slug) == slug
}

/// job_slug
///
/// Slug for a new job: `{title}-{company}` slugified, followed by the creation time in base36
/// milliseconds and four random hex digits so that identical postings never collide.
pub fn job_slug(title: &str, company: &str, created_at: DateTime<Utc>) -> String {
    let base = to_slug(&format!("{title}-{company}"));
    let millis = u64::try_from(created_at.timestamp_millis()).unwrap_or(0);
    let nonce = Uuid::new_v4().simple().to_string();
    let suffix = format!("{}{}", to_base36(millis), &nonce[..4]);

    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
