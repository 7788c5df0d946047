use super::*;

fn t(id: &str, duration: Option<&str>) -> Track {
    Track {
        id: id.into(),
        title: id.into(),
        thumbnail_url: String::new(),
        channel_title: None,
        duration_iso8601: duration.map(str::to_string),
    }
}

#[test]
fn parses_hours_minutes_seconds() {
    assert_eq!(parse_iso8601_seconds("PT1H2M3S"), 3723);
    assert_eq!(format_seconds(3723), "1:02:03");
}

#[test]
fn parses_minutes_only() {
    assert_eq!(parse_iso8601_seconds("PT5M"), 300);
    assert_eq!(format_seconds(300), "5:00");
    assert_eq!(parse_iso8601_seconds("PT45S"), 45);
    assert_eq!(parse_iso8601_seconds("PT3M7S"), 187);
}

#[test]
fn parses_day_component() {
    assert_eq!(parse_iso8601_seconds("P1DT1S"), 86_401);
    assert_eq!(parse_iso8601_seconds("P2D"), 172_800);
}

#[test]
fn malformed_durations_degrade_to_zero() {
    for bad in ["", "PT", "P", "5M", "PT5X", "PTM", "PT5M3", "PT3S5M", "garbage", "PT1H1H"] {
        assert_eq!(parse_iso8601_seconds(bad), 0, "input {bad:?}");
    }
    assert_eq!(format_seconds(parse_iso8601_seconds("nope")), "0:00");
}

#[test]
fn format_pads_minutes_only_when_hours_present() {
    assert_eq!(format_seconds(0), "0:00");
    assert_eq!(format_seconds(59), "0:59");
    assert_eq!(format_seconds(600), "10:00");
    assert_eq!(format_seconds(3600), "1:00:00");
}

#[test]
fn track_duration_seconds_handles_missing_duration() {
    assert_eq!(t("a", Some("PT2M")).duration_seconds(), 120);
    assert_eq!(t("b", None).duration_seconds(), 0);
    assert_eq!(t("c", Some("bogus")).duration_seconds(), 0);
}

#[test]
fn playlist_total_sums_item_durations() {
    let p = Playlist {
        id: 1,
        name: "mix".into(),
        items: vec![t("a", Some("PT1M")), t("b", Some("PT30S")), t("c", None)],
    };
    assert_eq!(p.total_seconds(), 90);
}

#[test]
fn decodes_common_entities() {
    assert_eq!(decode_html_entities("Tom &amp; Jerry"), "Tom & Jerry");
    assert_eq!(decode_html_entities("&quot;Hi&quot; it&#39;s"), "\"Hi\" it's");
    assert_eq!(decode_html_entities("a &lt;b&gt;"), "a <b>");
    assert_eq!(decode_html_entities("&amp;quot;"), "&quot;");
    assert_eq!(decode_html_entities("plain"), "plain");
}

#[test]
fn playlist_item_json_maps_to_track() {
    let json = r#"{
        "id": 7,
        "name": "Road trip",
        "items": [
            {"video_id": "abc", "title": "Song", "thumbnail": "http://img/1.jpg",
             "channel_title": "Band", "duration": "PT3M"},
            {"video_id": "def", "title": "Other"}
        ]
    }"#;
    let p: Playlist = serde_json::from_str(json).unwrap();
    assert_eq!(p.id, 7);
    assert_eq!(p.items.len(), 2);
    assert_eq!(p.items[0].id, "abc");
    assert_eq!(p.items[0].thumbnail_url, "http://img/1.jpg");
    assert_eq!(p.items[0].channel_title.as_deref(), Some("Band"));
    assert_eq!(p.items[0].duration_seconds(), 180);
    assert_eq!(p.items[1].channel_title, None);
    assert_eq!(p.items[1].duration_iso8601, None);
}

#[test]
fn search_item_prefers_high_thumbnail() {
    let json = r#"{
        "id": {"kind": "youtube#video", "videoId": "xyz"},
        "etag": "e",
        "kind": "youtube#searchResult",
        "snippet": {
            "channelId": "c",
            "channelTitle": "Channel",
            "title": "Title &amp; more",
            "publishedAt": "2024-01-01T00:00:00Z",
            "thumbnails": {
                "default": {"url": "d.jpg", "width": 1, "height": 1},
                "high": {"url": "h.jpg", "width": 3, "height": 3}
            }
        },
        "duration": "PT4M2S"
    }"#;
    let item: SearchItem = serde_json::from_str(json).unwrap();
    let track = Track::from(item);
    assert_eq!(track.id, "xyz");
    assert_eq!(track.thumbnail_url, "h.jpg");
    assert_eq!(track.channel_title.as_deref(), Some("Channel"));
    assert_eq!(track.title, "Title &amp; more");
    assert_eq!(track.duration_seconds(), 242);
}
