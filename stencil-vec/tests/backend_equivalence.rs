use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use stencil_tuple::DimNames;
use stencil_vec::{
    ctrl_idx_mask, ctrl_sel_bit, BinOp, Fold, FoldShape, Linear, MaybeSimdOps, Native, RealVec,
    Reference, APPROX_DIV_REL_TOL,
};

type V8 = RealVec<f32, Linear<8>, 8>;
type V16 = RealVec<f32, Fold<1, 4, 4, 1>, 16>;
type V4d = RealVec<f64, Fold<1, 2, 2, 1, false>, 4>;
type V6 = RealVec<f32, Fold<1, 3, 2, 1>, 6>;

fn random_v8(rng: &mut StdRng) -> V8 {
    V8::from_fn(|_| rng.gen_range(-100.0..100.0))
}

fn random_v16(rng: &mut StdRng) -> V16 {
    V16::from_fn(|_| rng.gen_range(-100.0..100.0))
}

fn random_v4d(rng: &mut StdRng) -> V4d {
    V4d::from_fn(|_| rng.gen_range(-1.0e3..1.0e3))
}

#[test]
fn test_arithmetic_matches_reference() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let (a, b) = (random_v16(&mut rng), random_v16(&mut rng));
        for op in [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div] {
            assert_eq!(
                a.binary_with::<Native>(op, &b).to_array(),
                a.binary_with::<Reference>(op, &b).to_array(),
                "{}",
                op.name()
            );
        }
        assert_eq!(a.neg_with::<Native>(), a.neg_with::<Reference>());

        let (c, d) = (random_v4d(&mut rng), random_v4d(&mut rng));
        for op in [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div] {
            assert_eq!(c.binary_with::<Native>(op, &d), c.binary_with::<Reference>(op, &d));
        }
    }
}

#[test]
fn test_div_approx_within_bound() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..200 {
        let a = random_v8(&mut rng);
        let b = V8::from_fn(|_| {
            let m: f32 = rng.gen_range(0.01..1000.0);
            if rng.gen_bool(0.5) {
                m
            } else {
                -m
            }
        });
        let exact = a.binary_with::<Reference>(BinOp::Div, &b);
        for approx in [a.div_approx_with::<Native>(&b), a.div_approx_with::<Reference>(&b)] {
            for l in 0..8 {
                assert_relative_eq!(
                    approx.get(l),
                    exact.get(l),
                    max_relative = APPROX_DIV_REL_TOL as f32
                );
            }
        }
    }
}

fn check_align<const COUNT: usize>(a: &V8, b: &V8, rng: &mut StdRng) {
    let native = V8::align_with::<COUNT, Native>(a, b);
    let reference = V8::align_with::<COUNT, Reference>(a, b);
    assert_eq!(native, reference, "align::<{COUNT}>");
    for l in 0..8 {
        let expected = if l + COUNT < 8 { b.get(l + COUNT) } else { a.get(l + COUNT - 8) };
        assert_eq!(reference.get(l), expected);
    }

    let prior = random_v8(rng);
    for mask in 0..=0xffu64 {
        let mut rn = prior;
        let mut rr = prior;
        rn.align_masked_with::<COUNT, Native>(a, b, mask);
        rr.align_masked_with::<COUNT, Reference>(a, b, mask);
        assert_eq!(rn, rr, "align_masked::<{COUNT}> mask {mask:#x}");
        for l in 0..8 {
            let want = if (mask >> l) & 1 == 1 { reference.get(l) } else { prior.get(l) };
            assert_eq!(rr.get(l), want);
        }
    }
}

#[test]
fn test_align_matches_reference_for_every_count_and_mask() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..5 {
        let (a, b) = (random_v8(&mut rng), random_v8(&mut rng));
        check_align::<0>(&a, &b, &mut rng);
        check_align::<1>(&a, &b, &mut rng);
        check_align::<2>(&a, &b, &mut rng);
        check_align::<3>(&a, &b, &mut rng);
        check_align::<4>(&a, &b, &mut rng);
        check_align::<5>(&a, &b, &mut rng);
        check_align::<6>(&a, &b, &mut rng);
        check_align::<7>(&a, &b, &mut rng);
        check_align::<8>(&a, &b, &mut rng);
        assert_eq!(V8::align::<0>(&a, &b), b);
        assert_eq!(V8::align::<8>(&a, &b), a);
    }
}

/// Native and reference `permute_masked` agree for every mask, and lanes
/// outside the mask keep `prior`.
fn check_permute_masked<T: MaybeSimdOps, F: FoldShape, const VLEN: usize>(
    ctrl: &RealVec<T, F, VLEN>,
    a: &RealVec<T, F, VLEN>,
    prior: &RealVec<T, F, VLEN>,
    masks: impl Iterator<Item = u64>,
) {
    for mask in masks {
        let mut pn = *prior;
        let mut pr = *prior;
        pn.permute_masked_with::<Native>(ctrl, a, mask);
        pr.permute_masked_with::<Reference>(ctrl, a, mask);
        assert_eq!(pn, pr, "permute_masked mask {mask:#x}");
        for l in 0..VLEN {
            let want = if (mask >> l) & 1 == 1 {
                let raw: u64 = ctrl.ctrl(l).into();
                a.get((raw & ctrl_idx_mask::<T>()) as usize)
            } else {
                prior.get(l)
            };
            assert_eq!(pr.get(l), want);
        }
    }
}

#[test]
fn test_permute_matches_reference() {
    let mut rng = StdRng::seed_from_u64(14);
    let sel = ctrl_sel_bit::<f32>();
    for _ in 0..50 {
        let a = random_v8(&mut rng);
        let b = random_v8(&mut rng);
        let ctrl = V8::from_indices(std::array::from_fn(|_| {
            let idx = rng.gen_range(0..8u64);
            if rng.gen_bool(0.5) {
                idx | sel
            } else {
                idx
            }
        }));

        let native = V8::permute_with::<Native>(&ctrl, &a);
        let reference = V8::permute_with::<Reference>(&ctrl, &a);
        assert_eq!(native, reference);

        let prior = random_v8(&mut rng);
        check_permute_masked(&ctrl, &a, &prior, 0..=V8::ALL_LANES);

        let p2n = V8::permute2_with::<Native>(&ctrl, &a, &b).unwrap();
        let p2r = V8::permute2_with::<Reference>(&ctrl, &a, &b).unwrap();
        assert_eq!(p2n, p2r);
        for l in 0..8 {
            let c = u64::from(ctrl.ctrl(l));
            let src = if c & sel != 0 { &b } else { &a };
            assert_eq!(p2r.get(l), src.get((c & (sel - 1)) as usize));
        }

        assert!(V8::permute2_with::<Native<false>>(&ctrl, &a, &b).is_err());
    }
}

#[test]
fn test_permute_f64_matches_reference() {
    let mut rng = StdRng::seed_from_u64(15);
    let sel = ctrl_sel_bit::<f64>();
    for _ in 0..100 {
        let a = random_v4d(&mut rng);
        let b = random_v4d(&mut rng);
        let ctrl = V4d::from_indices(std::array::from_fn(|_| {
            let idx = rng.gen_range(0..4u64);
            if rng.gen_bool(0.5) {
                idx | sel
            } else {
                idx
            }
        }));
        assert_eq!(
            V4d::permute_with::<Native>(&ctrl, &a),
            V4d::permute_with::<Reference>(&ctrl, &a)
        );
        check_permute_masked(&ctrl, &a, &random_v4d(&mut rng), 0..=V4d::ALL_LANES);
        assert_eq!(
            V4d::permute2_with::<Native>(&ctrl, &a, &b),
            V4d::permute2_with::<Reference>(&ctrl, &a, &b)
        );
    }
}

#[test]
fn test_permute_masked_non_power_of_two_lanes() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..50 {
        let a = V6::from_fn(|_| rng.gen_range(-100.0..100.0));
        let prior = V6::from_fn(|_| rng.gen_range(-100.0..100.0));
        let ctrl = V6::from_indices(std::array::from_fn(|_| rng.gen_range(0..6u64)));
        check_permute_masked(&ctrl, &a, &prior, 0..=V6::ALL_LANES);
    }

    // Lane 5 names lane 7, which does not exist, but it is masked off.
    let a = V6::from_array([5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
    let ctrl = V6::from_indices([5, 4, 3, 2, 1, 7]);
    let prior = V6::splat(-1.0);
    check_permute_masked(&ctrl, &a, &prior, 0..0b10_0000);

    let mut res = prior;
    res.permute_masked(&ctrl, &a, 0b01_1111);
    assert_eq!(res.to_array(), [0.0, 1.0, 2.0, 3.0, 4.0, -1.0]);
}

#[test]
fn test_loads_and_stores_round_trip() {
    let mut rng = StdRng::seed_from_u64(16);
    let buf: Vec<f32> = (0..40).map(|_| rng.gen()).collect();
    for start in 0..=(buf.len() - 16) {
        let v = V16::from_slice(&buf[start..]).unwrap();
        assert_eq!(v.as_slice(), &buf[start..start + 16]);

        let mut out = vec![0.0f32; 20];
        v.store_unaligned(&mut out[start % 4..]).unwrap();
        assert_eq!(&out[start % 4..start % 4 + 16], v.as_slice());

        let mut n = V16::zero();
        let mut r = V16::zero();
        v.store_streaming_with::<Native>(&mut n);
        v.store_streaming_with::<Reference>(&mut r);
        assert_eq!(n, v);
        assert_eq!(r, v);
    }
    assert!(V16::from_slice(&buf[30..]).is_err());
}

#[test]
fn test_fold_lane_index_matches_tuple_layout() {
    fn check<F: FoldShape>() {
        let names = DimNames::new();
        let extents = F::to_tuple(&names);
        for pt in extents.points() {
            assert_eq!(
                F::lane_index(pt.get_val(0), pt.get_val(1), pt.get_val(2), pt.get_val(3)),
                extents.layout(&pt, true)
            );
        }
    }
    check::<Fold<1, 4, 4, 1>>();
    check::<Fold<1, 2, 2, 1, false>>();
    check::<Fold<2, 2, 2, 2, true>>();
    check::<Fold<2, 2, 2, 2, false>>();
    check::<Linear<16>>();
}

#[test]
fn test_fold_access_follows_layout() {
    let v = V4d::from_fn(|i| i as f64);
    // Last-inner fold: z is unit stride, then y, then x.
    assert_eq!(v.at(0, 0, 0, 0), 0.0);
    assert_eq!(v.at(0, 0, 1, 0), 1.0);
    assert_eq!(v.at(0, 1, 0, 0), 2.0);
    assert_eq!(v.at(0, 1, 1, 0), 3.0);
}
