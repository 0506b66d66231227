//! Navigation contract.
//!
//! Every automated navigation into the portal carries the session token as a
//! query parameter on the entry URL; the token is the sole binding between a
//! freshly loaded page and the in-flight session.

use portalscan_core_types::ScanId;
use url::Url;

pub const SCAN_ID_PARAM: &str = "ps_scan_id";

/// Entry URL stamped with the session token. Any token already present is
/// replaced; other query parameters survive.
pub fn entry_url(base: &Url, scan_id: &ScanId) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SCAN_ID_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SCAN_ID_PARAM, scan_id.as_str());
    }
    url
}

/// Token embedded in a loaded page's URL, if any well-formed one is present.
pub fn scan_id_from_url(url: &Url) -> Option<ScanId> {
    url.query_pairs()
        .find(|(key, _)| key == SCAN_ID_PARAM)
        .and_then(|(_, value)| ScanId::parse(&value).ok())
}
