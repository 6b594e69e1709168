//! Magnet URI composition, grounded on `original_source/src/magnet_uri.cpp`'s
//! `make_magnet_uri(metafile, protocol)`: `xt` topic(s), `dn`, `tr` per
//! tier, `ws`.

use crate::models::Torrent;

/// Build a `magnet:?` URI for `torrent`. Hybrid torrents get both an
/// `xt=urn:btih:` (v1) and `xt=urn:btmh:1220` (v2, BEP-52 multihash prefix
/// for SHA-256) topic.
pub fn build_magnet_uri(torrent: &Torrent) -> String {
    let mut params: Vec<String> = Vec::new();

    if let Some(h) = torrent.info_hash_v1() {
        params.push(format!("xt=urn:btih:{}", hex::encode(h)));
    }
    if let Some(h) = torrent.info_hash_v2() {
        params.push(format!("xt=urn:btmh:1220{}", hex::encode(h)));
    }

    params.push(format!("dn={}", urlencoding::encode(&torrent.info.name)));

    if let Some(list) = &torrent.announce_list {
        for tier in list {
            for url in tier {
                params.push(format!("tr={}", urlencoding::encode(url)));
            }
        }
    } else if let Some(announce) = &torrent.announce {
        params.push(format!("tr={}", urlencoding::encode(announce)));
    }

    if let Some(web_seeds) = &torrent.url_list {
        for ws in web_seeds {
            params.push(format!("ws={}", urlencoding::encode(ws)));
        }
    }

    format!("magnet:?{}", params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Info;

    fn base_torrent() -> Torrent {
        Torrent {
            announce: Some("http://tracker/announce".to_string()),
            announce_list: None,
            comment: None,
            created_by: "torrite test".to_string(),
            creation_date: None,
            info: Info {
                piece_length: 16384,
                pieces: Some(serde_bytes::ByteBuf::from(vec![0u8; 20])),
                name: "example".to_string(),
                private: None,
                files: None,
                length: Some(16384),
                source: None,
                x_cross_seed: None,
                meta_version: None,
                file_tree: None,
            },
            url_list: None,
            piece_layers: None,
            nodes: None,
            similar: None,
            collections: None,
        }
    }

    #[test]
    fn includes_display_name_and_tracker() {
        let torrent = base_torrent();
        let uri = build_magnet_uri(&torrent);
        assert!(uri.starts_with("magnet:?xt=urn:btih:"));
        assert!(uri.contains("dn=example"));
        assert!(uri.contains("tr=http%3A%2F%2Ftracker%2Fannounce"));
    }
}
