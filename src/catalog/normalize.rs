//! One explicit mapping per catalog payload into the canonical models.
use crate::models::{CaptionTrack, Episode, Interval, StreamSource, StreamVariant, VariantKind};

use super::wire::{HentaiResponse, RawInterval, StandardEpisode, StreamingInfoEntry};

/// A mature search hit: the matched series name and its episodes.
#[derive(Debug, Clone)]
pub struct MatureMatch {
    pub name: String,
    pub episodes: Vec<Episode>,
}

/// Only the first result of a mature search is considered a match.
pub fn mature_match(resp: HentaiResponse) -> Option<MatureMatch> {
    let first = resp.results.into_iter().next()?;
    let episodes = first
        .episodes
        .into_iter()
        .map(|ep| Episode {
            id: ep.id,
            display_title: ep.name,
            sequence_number: None,
            native_title: None,
        })
        .collect();
    Some(MatureMatch {
        name: first.name,
        episodes,
    })
}

pub fn standard_episodes(raw: Vec<StandardEpisode>) -> Vec<Episode> {
    raw.into_iter()
        .map(|ep| Episode {
            id: ep.id,
            display_title: ep.title,
            sequence_number: ep.episode_no.or(ep.number),
            native_title: ep.japanese_title.filter(|t| !t.is_empty()),
        })
        .collect()
}

fn interval(raw: Option<RawInterval>) -> Option<Interval> {
    raw.filter(|i| i.end > i.start).map(|i| Interval {
        start_sec: i.start,
        end_sec: i.end,
    })
}

/// Keep fulfilled sub/dub entries, in catalog order.
pub fn stream_variants(entries: Vec<StreamingInfoEntry>) -> Vec<StreamVariant> {
    entries
        .into_iter()
        .filter_map(|entry| {
            if entry.status != "fulfilled" {
                tracing::debug!("Skipping stream entry with status {:?}", entry.status);
                return None;
            }
            let result = entry.value?.decryption_result?;
            let kind = match result.kind.parse::<VariantKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::debug!("Skipping stream entry: {e}");
                    return None;
                }
            };
            let source = result.source;
            Some(StreamVariant {
                kind,
                sources: source
                    .sources
                    .into_iter()
                    .map(|s| StreamSource {
                        file_url: s.file,
                        media_type: s.kind,
                    })
                    .collect(),
                caption_tracks: source
                    .tracks
                    .into_iter()
                    .map(|t| CaptionTrack {
                        file_url: t.file,
                        label: t.label,
                        kind: t.kind,
                        is_default: t.default,
                    })
                    .collect(),
                is_encrypted: source.encrypted,
                intro: interval(source.intro),
                outro: interval(source.outro),
                provider_server: result.server,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::wire::StreamResponse;

    #[test]
    fn mature_match_takes_first_result_only() {
        let resp: HentaiResponse = serde_json::from_str(
            r#"{"results":[
                {"name":"First","episodes":[{"id":1,"name":"A"},{"id":2,"name":"B"}]},
                {"name":"Second","episodes":[{"id":9,"name":"Z"}]}
            ]}"#,
        )
        .unwrap();
        let m = mature_match(resp).unwrap();
        assert_eq!(m.name, "First");
        let ids: Vec<_> = m.episodes.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(m.episodes[1].display_title, "B");
    }

    #[test]
    fn mature_match_is_none_without_results() {
        assert!(mature_match(HentaiResponse::default()).is_none());
    }

    #[test]
    fn standard_episode_number_prefers_episode_no() {
        let eps = standard_episodes(vec![
            StandardEpisode {
                id: "a".into(),
                title: "One".into(),
                episode_no: Some("1".into()),
                number: Some("99".into()),
                japanese_title: Some("".into()),
            },
            StandardEpisode {
                id: "b".into(),
                title: "Two".into(),
                episode_no: None,
                number: Some("2".into()),
                japanese_title: Some("二".into()),
            },
        ]);
        assert_eq!(eps[0].sequence_number.as_deref(), Some("1"));
        assert_eq!(eps[0].native_title, None);
        assert_eq!(eps[1].sequence_number.as_deref(), Some("2"));
        assert_eq!(eps[1].native_title.as_deref(), Some("二"));
    }

    #[test]
    fn stream_variants_keep_fulfilled_sub_and_dub() {
        let resp: StreamResponse = serde_json::from_str(
            r#"{"success":true,"results":{"streamingInfo":[
                {"status":"fulfilled","value":{"decryptionResult":{"type":"sub","server":"hd-1",
                  "source":{"sources":[{"file":"https://cdn/sub.m3u8","type":"hls"}],
                            "tracks":[{"file":"https://cdn/en.vtt","label":"English","kind":"captions","default":true},
                                      {"file":"https://cdn/thumbs.vtt","kind":"thumbnails"}],
                            "encrypted":false,
                            "intro":{"start":31,"end":120},"outro":{"start":0,"end":0}}}}},
                {"status":"rejected"},
                {"status":"fulfilled","value":{"decryptionResult":{"type":"raw","server":"hd-2","source":{}}}},
                {"status":"fulfilled","value":{"decryptionResult":{"type":"dub","server":"hd-2",
                  "source":{"sources":[{"file":"https://cdn/dub.m3u8","type":"hls"}],"encrypted":true}}}}
            ]}}"#,
        )
        .unwrap();

        let variants = stream_variants(resp.results.unwrap().streaming_info);
        assert_eq!(variants.len(), 2);

        let sub = &variants[0];
        assert_eq!(sub.kind, VariantKind::Sub);
        assert_eq!(sub.primary_source().unwrap().file_url, "https://cdn/sub.m3u8");
        assert_eq!(sub.caption_tracks.len(), 2);
        assert!(sub.caption_tracks[0].is_default);
        assert_eq!(sub.caption_tracks[1].label, None);
        assert_eq!(
            sub.intro,
            Some(Interval {
                start_sec: 31.0,
                end_sec: 120.0
            })
        );
        assert_eq!(sub.outro, None);
        assert_eq!(sub.provider_server, "hd-1");

        let dub = &variants[1];
        assert_eq!(dub.kind, VariantKind::Dub);
        assert!(dub.is_encrypted);
        assert!(dub.caption_tracks.is_empty());
    }

    #[test]
    fn malformed_entry_does_not_sink_its_neighbours() {
        let resp: StreamResponse = serde_json::from_str(
            r#"{"success":true,"results":{"streamingInfo":[
                {"status":"fulfilled","value":{"decryptionResult":{"type":"sub","server":"hd-1",
                  "source":{"sources":[{"file":"https://cdn/sub.m3u8","type":"hls"}]}}}},
                {"status":"fulfilled","value":{"decryptionResult":{"type":"dub","server":"hd-2","source":null}}},
                "garbage"
            ]}}"#,
        )
        .unwrap();

        let variants = stream_variants(resp.results.unwrap().streaming_info);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].kind, VariantKind::Sub);
        assert_eq!(
            variants[0].primary_source().unwrap().file_url,
            "https://cdn/sub.m3u8"
        );
    }
}
