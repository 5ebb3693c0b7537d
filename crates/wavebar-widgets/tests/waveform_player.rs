//! End-to-end behaviour of the waveform player against fake media and host

mod common;

use common::{fill_count, host, player, wav_bytes, FakeMedia, MapFetcher};
use wavebar_core::cache::KeyValueCache;
use wavebar_core::config::ViewOptions;
use wavebar_core::error::{ConfigError, LoadError};
use wavebar_core::playlist::{Playlist, SequencerState};
use wavebar_core::source::{Track, WaveformSource};
use wavebar_core::transport::MediaEventKind;
use wavebar_core::AmplitudeSeries;
use wavebar_widgets::waveform::CssLength;
use wavebar_widgets::{CanvasHost, Host, HostEvent, ViewPhase, WaveformView};

fn mono_fetcher() -> MapFetcher {
    MapFetcher::default().with("mono.wav", wav_bytes(1, 44_100, 44_100))
}

#[tokio::test]
async fn test_mono_fixture_reduces_to_requested_points() {
    let mut player = player(FakeMedia::new(1.0), mono_fetcher(), ViewOptions::default(), 256);

    player.load(&Track::new("mono.wav")).await.unwrap();

    let series = player.view().series();
    assert_eq!(series.len(), 256);
    assert!(series.iter().all(|v| (-1.0..=1.0).contains(v)));
    assert!((series.peak() - 1.0).abs() < 1e-6);

    // 512px fixed width, 2px bars with 1px gaps
    assert_eq!(fill_count(&player), 512 / 3);
}

#[tokio::test]
async fn test_stereo_fixture_reduces_to_requested_points() {
    let fetcher = MapFetcher::default().with("stereo.wav", wav_bytes(2, 48_000, 12_000));
    let mut player = player(FakeMedia::new(0.25), fetcher, ViewOptions::default(), 256);

    player.load(&Track::new("stereo.wav")).await.unwrap();
    assert_eq!(player.view().series().len(), 256);
}

#[test]
fn test_unknown_container_fails_synchronously() {
    let result = WaveformView::new(host(), "#nonexistent", ViewOptions::default());
    match result {
        Err(ConfigError::ElementNotFound(selector)) => assert_eq!(selector, "#nonexistent"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("view was created for a missing container"),
    }
}

#[test]
fn test_surface_width_style_follows_mode() {
    let fixed = WaveformView::new(host(), "#player", ViewOptions::default()).unwrap();
    let style = fixed.host().surface(fixed.surface().unwrap()).unwrap().style;
    assert_eq!(style.width.to_string(), "512px");
    assert_eq!(style.height.to_string(), "128px");

    let responsive = WaveformView::new(
        host(),
        "#player",
        ViewOptions {
            responsive: true,
            ..Default::default()
        },
    )
    .unwrap();
    let style = responsive
        .host()
        .surface(responsive.surface().unwrap())
        .unwrap()
        .style;
    assert_eq!(style.width, CssLength::Percent(100.0));
    assert_eq!(style.width.to_string(), "100%");
    assert_eq!(style.pixel_width, 400);
}

#[tokio::test]
async fn test_reloading_does_not_accumulate_media_listeners() {
    let fetcher = mono_fetcher().with("other.wav", wav_bytes(1, 22_050, 8_000));
    let mut player = player(FakeMedia::new(1.0), fetcher, ViewOptions::default(), 64);

    player.load(&Track::new("mono.wav")).await.unwrap();
    player.load(&Track::new("other.wav")).await.unwrap();

    let media = player.player().media();
    for kind in [
        MediaEventKind::CanPlay,
        MediaEventKind::TimeUpdate,
        MediaEventKind::Ended,
        MediaEventKind::Error,
    ] {
        assert_eq!(media.active(kind), 1, "{:?}", kind);
    }
    // One handler per kind per load; the first load's four were removed
    assert_eq!(media.adds, 8);
    assert_eq!(media.removes, 4);
}

#[tokio::test]
async fn test_media_failure_rejects_and_instance_stays_usable() {
    let media = FakeMedia::new(1.0).failing("broken", 3);
    let fetcher = mono_fetcher().with("broken.wav", wav_bytes(1, 8_000, 800));
    let mut player = player(media, fetcher, ViewOptions::default(), 128);

    let err = player.load(&Track::new("broken.wav")).await.unwrap_err();
    assert_eq!(err.category(), "decode");
    assert!(matches!(err, LoadError::Media { code: 3, .. }));
    assert!(player.view().series().is_empty());

    player.load(&Track::new("mono.wav")).await.unwrap();
    assert_eq!(player.view().series().len(), 128);
}

#[tokio::test]
async fn test_failed_reload_clears_previous_waveform() {
    let media = FakeMedia::new(10.0).failing("broken", 2);
    let fetcher = mono_fetcher().with("broken.wav", wav_bytes(1, 8_000, 800));
    let mut player = player(media, fetcher, ViewOptions::default(), 64);

    player.load(&Track::new("mono.wav")).await.unwrap();
    player.seek_to_fraction(0.5);
    assert_eq!(player.view().series().len(), 64);
    assert_eq!(player.view().progress(), 0.5);

    let err = player.load(&Track::new("broken.wav")).await.unwrap_err();
    assert_eq!(err.category(), "network");
    assert_eq!(player.player().source(), Some("broken.wav"));
    assert!(player.view().series().is_empty());
    assert_eq!(player.view().progress(), 0.0);
    assert_eq!(fill_count(&player), 0);
}

#[tokio::test]
async fn test_waveform_fetch_failure_rejects_with_network_category() {
    let mut player = player(FakeMedia::new(1.0), mono_fetcher(), ViewOptions::default(), 128);
    let track = Track::with_waveform("mono.wav", WaveformSource::json("missing.json"));

    let err = player.load(&track).await.unwrap_err();
    assert_eq!(err.category(), "network");
    assert!(err.to_string().contains("missing.json"));

    player.load(&Track::new("mono.wav")).await.unwrap();
    assert_eq!(player.view().series().len(), 128);
}

#[tokio::test]
async fn test_json_waveform_uses_first_key_verbatim() {
    let fetcher = mono_fetcher().with("peaks.json", br#"{"left": [0.1, -0.4, 0.2], "right": [1.0]}"#.to_vec());
    let mut player = player(FakeMedia::new(1.0), fetcher, ViewOptions::default(), 800);

    let track = Track::with_waveform("mono.wav", WaveformSource::json("peaks.json"));
    player.load(&track).await.unwrap();

    assert_eq!(player.view().series().as_slice(), &[0.1, -0.4, 0.2]);
    // Only the JSON document is fetched; the audio goes to the media element
    assert_eq!(*player.loader().fetcher().fetches.borrow(), vec!["peaks.json".to_string()]);
    assert_eq!(
        player.loader().cache().get("wavebar:peaks.json").as_deref(),
        Some("[0.1,-0.4,0.2]")
    );
}

#[tokio::test]
async fn test_click_seeks_and_moves_progress() {
    let options = ViewOptions {
        width: 400,
        ..Default::default()
    };
    let mut player = player(FakeMedia::new(20.0), mono_fetcher(), options, 64);
    player.load(&Track::new("mono.wav")).await.unwrap();

    // Container left edge at 100, surface 400px wide
    let time = player.handle_click(200.0).unwrap();
    assert_eq!(time, 5.0);
    assert_eq!(player.player().current_time(), 5.0);
    assert_eq!(player.view().progress(), 0.25);

    // The Seeked event agrees with the optimistic progress
    assert!(player.sync() >= 1);
    assert_eq!(player.view().progress(), 0.25);
}

#[tokio::test]
async fn test_time_updates_drive_progress() {
    let mut player = player(FakeMedia::new(10.0), mono_fetcher(), ViewOptions::default(), 64);
    player.load(&Track::new("mono.wav")).await.unwrap();

    player
        .player_mut()
        .media_mut()
        .fire(wavebar_core::MediaEvent::TimeUpdate {
            current_time: 2.5,
            duration: 10.0,
        });
    assert_eq!(player.sync(), 1);
    assert_eq!(player.view().progress(), 0.25);
}

#[tokio::test]
async fn test_destroy_tears_everything_down() {
    let options = ViewOptions {
        responsive: true,
        ..Default::default()
    };
    let mut player = player(FakeMedia::new(1.0), mono_fetcher(), options, 64);
    player.load(&Track::new("mono.wav")).await.unwrap();
    let surface = player.view().surface().unwrap();

    player.destroy();
    player.destroy();

    let view = player.view();
    assert_eq!(view.phase(), ViewPhase::Destroyed);
    assert!(view.surface().is_none());
    assert!(!view.host().surface_exists(surface));
    assert_eq!(view.host().listener_count(HostEvent::Resize), 0);
    assert_eq!(view.host().listener_count(HostEvent::Click), 0);
    assert_eq!(player.player().media().total_active(), 0);
}

#[tokio::test]
async fn test_playlist_drives_waveform_player() {
    let fetcher = mono_fetcher().with("b.wav", wav_bytes(1, 8_000, 4_000));
    let mut player = player(FakeMedia::new(4.0), fetcher, ViewOptions::default(), 32);
    let mut playlist = Playlist::new(vec![Track::new("mono.wav"), Track::new("b.wav")]);

    playlist.run(&mut player).await.unwrap();

    assert_eq!(playlist.state(), SequencerState::Ended);
    assert_eq!(player.player().source(), Some("b.wav"));
    assert_eq!(
        *player.loader().fetcher().fetches.borrow(),
        vec!["mono.wav".to_string(), "b.wav".to_string()]
    );

    // The sequencer forwards the mid-track update but consumes `Ended`
    assert_eq!(player.view().progress(), 0.5);
    player.sync();
    assert_eq!(player.view().progress(), 1.0);
}

#[test]
fn test_inline_series_redraw_on_resize() {
    let mut view = WaveformView::new(
        host(),
        "#player",
        ViewOptions {
            responsive: true,
            ..Default::default()
        },
    )
    .unwrap();
    view.set_data(AmplitudeSeries::new(vec![0.5; 400]));
    let count = |view: &WaveformView<CanvasHost>| {
        view.host()
            .surface(view.surface().unwrap())
            .unwrap()
            .draw_list
            .fill_count()
    };
    assert_eq!(count(&view), 400 / 3);

    let container = view.container();
    view.host_mut().set_container_bounds(container, 0.0, 90.0);
    view.flush_resize();
    assert_eq!(count(&view), 30);
}
