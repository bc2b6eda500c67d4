use super::*;

fn rgb_fixture() -> (AttackImage, TargetMask) {
    let (w, h) = (11, 9);
    let r = Plane::from_fn(w, h, |r, c| ((r * 29 + c * 7) % 200) as u8);
    let g = Plane::from_fn(w, h, |r, c| (255 - (r * 13 + c * 31) % 180) as u8);
    let b = Plane::from_fn(w, h, |r, c| if (r + c) % 2 == 0 { 20 } else { 230 });
    let mask = TargetMask::from_fn(w, h, |r, c| r % 3 == 1 && c % 3 == 1);
    (AttackImage::from_planes(vec![r, g, b]).unwrap(), mask)
}

fn attack(config: AttackConfig) -> AdaptiveMedianAttack {
    AdaptiveMedianAttack::from_config(&config, Bandwidth::new(1, 1)).unwrap()
}

#[test]
fn channels_are_attacked_independently() {
    let (image, mask) = rgb_fixture();
    let atk = attack(AttackConfig {
        allowed_ratio_of_change: 0.6,
        ..AttackConfig::default()
    });

    let mut joint_stats = RunStatistics::new();
    let joint = atk.counter_attack(&image, &mask, &mut joint_stats).unwrap();
    assert_eq!(joint_stats.len(), 3);

    for (ch, plane) in image.planes().into_iter().enumerate() {
        let mut single_stats = RunStatistics::new();
        let single = atk
            .counter_attack(&AttackImage::gray(plane), &mask, &mut single_stats)
            .unwrap();
        assert_eq!(single.plane(0).unwrap(), joint.plane(ch).unwrap());
        assert_eq!(single_stats.runs()[0], joint_stats.runs()[ch]);
    }
}

#[test]
fn statistics_accumulate_across_invocations() {
    let (image, mask) = rgb_fixture();
    let atk = attack(AttackConfig::default());
    let mut stats = RunStatistics::new();
    atk.counter_attack(&image, &mask, &mut stats).unwrap();
    atk.counter_attack(&image, &mask, &mut stats).unwrap();
    assert_eq!(stats.len(), 6);
    assert_eq!(stats.runs()[0], stats.runs()[3]);
    assert!(
        stats
            .runs()
            .iter()
            .all(|r| r.change_ratios.len() == mask.marked_count())
    );
}

#[test]
fn empty_mask_keeps_image_and_records_nothing() {
    let (image, _) = rgb_fixture();
    let mask = TargetMask::empty(image.width(), image.height());
    let mut stats = RunStatistics::new();
    let out = attack(AttackConfig::default())
        .counter_attack(&image, &mask, &mut stats)
        .unwrap();
    assert_eq!(out, image);
    assert!(stats.is_empty());
}

#[test]
fn accelerated_path_matches_reference_path() {
    let (image, mask) = rgb_fixture();
    let base = AttackConfig {
        allowed_ratio_of_change: 0.4,
        ..AttackConfig::default()
    };
    let mut ref_stats = RunStatistics::new();
    let reference = attack(base.clone())
        .counter_attack(&image, &mask, &mut ref_stats)
        .unwrap();

    let mut fast_stats = RunStatistics::new();
    let fast = attack(AttackConfig {
        use_accelerated_path: true,
        threads: Some(2),
        ..base
    })
    .counter_attack(&image, &mask, &mut fast_stats)
    .unwrap();

    assert_eq!(fast, reference);
    assert_eq!(fast_stats, ref_stats);
}

#[test]
fn unsupported_mode_combination_fails_at_construction() {
    let cfg = AttackConfig {
        unused_only: true,
        use_accelerated_path: true,
        ..AttackConfig::default()
    };
    let err = AdaptiveMedianAttack::from_config(&cfg, Bandwidth::new(1, 1)).unwrap_err();
    assert!(matches!(err, AttackError::UnsupportedConfig(_)));
}

#[test]
fn mask_must_match_image() {
    let (image, _) = rgb_fixture();
    let mask = TargetMask::empty(3, 3);
    let mut stats = RunStatistics::new();
    let err = attack(AttackConfig::default())
        .counter_attack(&image, &mask, &mut stats)
        .unwrap_err();
    assert!(matches!(err, AttackError::Validation(_)));
}

#[test]
fn verbose_flag_does_not_change_results() {
    let (image, mask) = rgb_fixture();
    let mut quiet_stats = RunStatistics::new();
    let quiet = attack(AttackConfig::default())
        .counter_attack(&image, &mask, &mut quiet_stats)
        .unwrap();
    let mut loud_stats = RunStatistics::new();
    let loud = attack(AttackConfig {
        verbose: true,
        ..AttackConfig::default()
    })
    .counter_attack(&image, &mask, &mut loud_stats)
    .unwrap();
    assert_eq!(quiet, loud);
    assert_eq!(quiet_stats, loud_stats);
}
