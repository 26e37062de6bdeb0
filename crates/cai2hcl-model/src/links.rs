//! Resource locator helpers
//!
//! Asset names and self-links are slash-separated paths such as
//! `//compute.googleapis.com/projects/p/zones/z/instances/i` or
//! `https://www.googleapis.com/compute/v1/projects/p/regions/r/...`.

const COMPUTE_PREFIX: &str = "https://www.googleapis.com/compute/";

/// Segment following `collection` in a slash-separated path
///
/// `parse_field_value("//x/projects/p/zones/z", "zones")` is `Some("z")`.
#[must_use]
pub fn parse_field_value<'a>(url: &'a str, collection: &str) -> Option<&'a str> {
    let mut segments = url.split('/');
    while let Some(segment) = segments.next() {
        if segment == collection {
            return segments.next().filter(|v| !v.is_empty());
        }
    }
    None
}

/// Last path segment of a self-link
#[must_use]
pub fn resource_name_from_self_link(link: &str) -> &str {
    link.trim_end_matches('/').rsplit('/').next().unwrap_or(link)
}

/// Rewrite a compute self-link of any API version to `v1`
///
/// Links not under the compute API are returned unchanged.
#[must_use]
pub fn self_link_to_v1(link: &str) -> String {
    match link.strip_prefix(COMPUTE_PREFIX).and_then(|rest| rest.split_once('/')) {
        Some((_, path)) => format!("{COMPUTE_PREFIX}v1/{path}"),
        None => link.to_string(),
    }
}

/// Remove a trailing `/cryptoKeyVersions/N` from a key name
#[must_use]
pub fn strip_key_version(kms_key: &str) -> &str {
    kms_key
        .find("/cryptoKeyVersions")
        .map_or(kms_key, |idx| &kms_key[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCE: &str = "//compute.googleapis.com/projects/my-proj/zones/us-central1-a/instances/vm-1";

    #[test]
    fn field_value_after_collection() {
        assert_eq!(parse_field_value(INSTANCE, "projects"), Some("my-proj"));
        assert_eq!(parse_field_value(INSTANCE, "zones"), Some("us-central1-a"));
        assert_eq!(parse_field_value(INSTANCE, "instances"), Some("vm-1"));
        assert_eq!(parse_field_value(INSTANCE, "regions"), None);
        assert_eq!(parse_field_value("projects/", "projects"), None);
    }

    #[test]
    fn name_from_self_link() {
        let link = "https://www.googleapis.com/compute/v1/projects/p/zones/z/machineTypes/e2-small";
        assert_eq!(resource_name_from_self_link(link), "e2-small");
        assert_eq!(resource_name_from_self_link("plain"), "plain");
    }

    #[test]
    fn v1_links() {
        let link = "https://www.googleapis.com/compute/beta/projects/p/global/networks/default";
        assert_eq!(
            self_link_to_v1(link),
            "https://www.googleapis.com/compute/v1/projects/p/global/networks/default"
        );
        assert_eq!(self_link_to_v1("other"), "other");
    }

    #[test]
    fn kms_key_version_removed() {
        let key = "projects/p/locations/l/keyRings/r/cryptoKeys/k/cryptoKeyVersions/3";
        assert_eq!(strip_key_version(key), "projects/p/locations/l/keyRings/r/cryptoKeys/k");
        assert_eq!(strip_key_version("projects/p/x"), "projects/p/x");
    }
}
