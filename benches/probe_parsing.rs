//! Benchmarks for ffprobe output parsing and engine request building
//!
//! Both run once per clip and once per transition step of every
//! concatenation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use clipforge_av::actions::{crossfade_request, normalize_request, SourceAudio};
use clipforge_av::probe::parse_ffprobe_json;
use clipforge_av::{FfmpegEngine, NormalizationProfile, TransitionKind, TransitionSpec};
use std::path::Path;

/// ffprobe output for a phone clip with one video and one audio stream
const FFPROBE_PHONE: &str = r#"{
    "streams": [
        {
            "index": 0,
            "codec_name": "hevc",
            "codec_type": "video",
            "width": 1920,
            "height": 1080,
            "r_frame_rate": "30000/1001",
            "avg_frame_rate": "30000/1001",
            "duration": "12.345000"
        },
        {
            "index": 1,
            "codec_name": "aac",
            "codec_type": "audio",
            "sample_rate": "44100",
            "channels": 2,
            "duration": "12.345000"
        }
    ],
    "format": {
        "filename": "/clips/IMG_0421.MOV",
        "nb_streams": 2,
        "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
        "duration": "12.345000",
        "size": "24871456",
        "bit_rate": "16117540"
    }
}"#;

/// ffprobe output for a screen recording with a data track and no audio
const FFPROBE_SCREEN: &str = r#"{
    "streams": [
        {
            "index": 0,
            "codec_name": "h264",
            "codec_type": "video",
            "width": 2560,
            "height": 1440,
            "r_frame_rate": "60/1",
            "avg_frame_rate": "0/0"
        },
        {
            "index": 1,
            "codec_name": "bin_data",
            "codec_type": "data"
        }
    ],
    "format": {
        "filename": "/clips/screen.mp4",
        "nb_streams": 2,
        "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
        "duration": "95.016667",
        "size": "58230112"
    }
}"#;

fn bench_ffprobe_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("ffprobe_parsing");

    for (name, json) in [("phone", FFPROBE_PHONE), ("screen", FFPROBE_SCREEN)] {
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::new("to_mediainfo", name), &json, |b, json| {
            b.iter(|| parse_ffprobe_json(Path::new("/clips/bench.mp4"), black_box(json)).unwrap());
        });
    }

    group.finish();
}

fn bench_request_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_building");
    let profile = NormalizationProfile::default();
    let spec = TransitionSpec::new(TransitionKind::CircleOpen, 1.5).unwrap();

    group.bench_function("normalize/silent_source", |b| {
        b.iter(|| {
            let request = normalize_request(
                black_box(Path::new("/clips/screen.mp4")),
                Path::new("/work/normalized/normalized_0003.mp4"),
                &profile,
                SourceAudio::Missing,
            );
            FfmpegEngine::args(&request)
        });
    });

    group.bench_function("crossfade", |b| {
        b.iter(|| {
            let request = crossfade_request(
                Path::new("/work/intermediate/step_0002.mp4"),
                Path::new("/work/normalized/normalized_0003.mp4"),
                Path::new("/work/intermediate/step_0003.mp4"),
                &spec,
                black_box(21.5),
                &profile,
            );
            FfmpegEngine::args(&request)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_ffprobe_parsing, bench_request_building);
criterion_main!(benches);
