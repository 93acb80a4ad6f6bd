#[cfg(test)]
mod tests {
    use ff::Field;
    use group::prime::PrimeCurveAffine;
    use group::{Curve, Group};
    use halo2curves::bn256::{Fr, G1Affine, G1};
    use halo2curves::CurveAffine;
    use msm_calldata::calldata::felts::felt_count;
    use msm_calldata::utils::field::{field_to_biguint, modulus, reduce_to_field};
    use msm_calldata::{
        build, build_with_options, cpu_msm, init, msm_calldata_builder, points_to_values, sample_points,
        sample_scalars, verify, CalldataOptions, CurveId, FunctionFelt, G1Point, MsmCalldata, MsmCurve, MsmError,
    };
    use num_bigint::BigUint;
    use num_traits::One;

    fn setup() {
        let _ = env_logger::builder().is_test(true).try_init();
        init().unwrap();
    }

    fn to_points<C: CurveAffine>(points: &[C]) -> Vec<G1Point> {
        points.iter().map(G1Point::from_affine).collect()
    }

    fn to_ints<F: ff::PrimeField>(scalars: &[F]) -> Vec<BigUint> {
        scalars.iter().map(field_to_biguint).collect()
    }

    fn random_calldata<C: MsmCurve>(n: usize) -> (Vec<C>, Vec<C::Scalar>, MsmCalldata) {
        let points = sample_points::<C>(n);
        let scalars = sample_scalars::<C::Scalar>(n);
        let cd = build(&to_points(&points), &to_ints(&scalars), C::ID).unwrap();
        (points, scalars, cd)
    }

    #[test]
    fn test_fixture_call() {
        setup();
        let values = vec![BigUint::from(1u32), BigUint::from(2u32)];
        let scalars = vec![BigUint::from(10u32)];
        let felts = msm_calldata_builder(&values, &scalars, 0, &CalldataOptions::default()).unwrap();

        let cd = MsmCalldata::from_felts(&felts, &CalldataOptions::default()).unwrap();
        let ten_g = (G1::generator() * Fr::from(10u64)).to_affine();
        assert_eq!(cd.result, G1Point::from_affine(&ten_g));
        assert_eq!(cd.curve, CurveId::Bn254);
        assert_eq!(felts.last(), Some(&BigUint::from(0u32)));
        assert_eq!(verify(&cd), Ok(()));
    }

    #[test]
    fn test_result_matches_cpu_msm_on_every_curve() {
        setup();
        fn check<C: MsmCurve>() {
            let (points, scalars, cd) = random_calldata::<C>(6);
            let expected = cpu_msm(&points, &scalars).to_affine();
            assert_eq!(cd.result, G1Point::from_affine(&expected), "{}", C::ID);
            assert_eq!(verify(&cd), Ok(()), "{}", C::ID);
        }
        check::<halo2curves::bn256::G1Affine>();
        check::<halo2curves::bls12381::G1Affine>();
        check::<halo2curves::secp256k1::Secp256k1Affine>();
        check::<halo2curves::secp256r1::Secp256r1Affine>();
        check::<halo2curves::grumpkin::G1Affine>();
    }

    #[test]
    fn test_shape_mismatch() {
        setup();
        let points = to_points(&sample_points::<G1Affine>(3));
        let scalars = to_ints(&sample_scalars::<Fr>(2));
        assert_eq!(
            build(&points, &scalars, CurveId::Bn254),
            Err(MsmError::ShapeMismatch { points: 3, scalars: 2 })
        );
        assert_eq!(
            build(&[], &scalars, CurveId::Bn254),
            Err(MsmError::ShapeMismatch { points: 0, scalars: 2 })
        );
    }

    #[test]
    fn test_empty_input() {
        setup();
        let cd = build(&[], &[], CurveId::Bn254).unwrap();
        assert!(cd.result.is_infinity());
        for q in cd.hint.points() {
            assert!(q.is_infinity());
        }
        for f in cd.hint.functions() {
            assert_eq!(f, &FunctionFelt::default());
        }
        assert!(cd.weights.is_empty());

        let felts = cd.to_felts(&CalldataOptions::default());
        assert_eq!(felts.len(), felt_count(&cd, &CalldataOptions::default()));
        assert_eq!(verify(&cd), Ok(()));
    }

    #[test]
    fn test_permutation_invariance() {
        setup();
        let points = to_points(&sample_points::<G1Affine>(5));
        let scalars = to_ints(&sample_scalars::<Fr>(5));
        let order = [3usize, 0, 4, 1, 2];
        let permuted_points: Vec<_> = order.iter().map(|i| points[*i].clone()).collect();
        let permuted_scalars: Vec<_> = order.iter().map(|i| scalars[*i].clone()).collect();

        let a = build(&points, &scalars, CurveId::Bn254).unwrap();
        let b = build(&permuted_points, &permuted_scalars, CurveId::Bn254).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.hint.q_low, b.hint.q_low);
        assert_eq!(a.hint.q_high, b.hint.q_high);
    }

    #[test]
    fn test_deterministic() {
        setup();
        let points = sample_points::<G1Affine>(2);
        let values = points_to_values(&points);
        let scalars = vec![BigUint::one(), BigUint::from(10u32)];
        let opts = CalldataOptions::default();
        let first = msm_calldata_builder(&values, &scalars, 0, &opts).unwrap();
        for _ in 0..3 {
            assert_eq!(msm_calldata_builder(&values, &scalars, 0, &opts).unwrap(), first);
        }
    }

    #[test]
    fn test_parallel_path_matches_serial() {
        setup();
        let points = to_points(&sample_points::<G1Affine>(12));
        let scalars = to_ints(&sample_scalars::<Fr>(12));
        let serial = build_with_options(
            &points,
            &scalars,
            CurveId::Bn254,
            &CalldataOptions {
                parallel_threshold: usize::MAX,
                ..CalldataOptions::default()
            },
        )
        .unwrap();
        let parallel = build_with_options(
            &points,
            &scalars,
            CurveId::Bn254,
            &CalldataOptions {
                parallel_threshold: 1,
                ..CalldataOptions::default()
            },
        )
        .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_serde_round_trips() {
        setup();
        let max = (BigUint::one() << 256usize) - BigUint::one();
        let points = to_points(&sample_points::<G1Affine>(2));
        let cd = build(&points, &[max.clone(), BigUint::from(7u32)], CurveId::Bn254).unwrap();

        let json = cd.to_json().unwrap();
        assert!(json.contains("n\""));
        assert_eq!(MsmCalldata::from_json(&json).unwrap(), cd);
        assert_eq!(MsmCalldata::from_bytes(&cd.to_bytes().unwrap()).unwrap(), cd);
        assert_eq!(MsmCalldata::from_base64(&cd.to_base64().unwrap()).unwrap(), cd);
        assert!(matches!(MsmCalldata::from_base64("not base64!"), Err(MsmError::Serialization(_))));
        assert!(matches!(MsmCalldata::from_json("{}"), Err(MsmError::Serialization(_))));
    }

    #[test]
    fn test_max_u256_scalar_in_json() {
        let max = (BigUint::one() << 256usize) - BigUint::one();
        let json = serde_json::to_string(&FunctionFelt {
            a_num: vec![max.clone()],
            ..FunctionFelt::default()
        })
        .unwrap();
        assert!(json.contains(&format!("\"{max}n\"")));
        let back: FunctionFelt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.a_num, vec![max]);
    }

    #[test]
    fn test_term_count_schema() {
        setup();
        for n in [0usize, 1, 4] {
            let (_, _, cd) = random_calldata::<G1Affine>(n);
            for digits in [false, true] {
                for points_and_scalars in [false, true] {
                    for pure in [false, true] {
                        let opts = CalldataOptions {
                            include_digits_decomposition: digits,
                            include_points_and_scalars: points_and_scalars,
                            serialize_as_pure_felt252_array: pure,
                            ..CalldataOptions::default()
                        };
                        assert_eq!(cd.to_felts(&opts).len(), felt_count(&cd, &opts));
                    }
                }
            }
        }
    }

    #[test]
    fn test_felts_decode_back() {
        setup();
        let (_, _, cd) = random_calldata::<halo2curves::secp256r1::Secp256r1Affine>(3);
        let opts = CalldataOptions {
            serialize_as_pure_felt252_array: true,
            ..CalldataOptions::default()
        };
        assert_eq!(MsmCalldata::from_felts(&cd.to_felts(&opts), &opts).unwrap(), cd);
    }

    #[test]
    fn test_identity_point_and_zero_scalar() {
        setup();
        let points = vec![G1Point::infinity(), G1Point::new(1u32.into(), 2u32.into())];
        let scalars = vec![BigUint::from(123u32), BigUint::from(0u32)];
        let cd = build(&points, &scalars, CurveId::Bn254).unwrap();
        assert!(cd.result.is_infinity());
        assert_eq!(verify(&cd), Ok(()));
    }

    #[test]
    fn test_cancelling_and_repeated_points() {
        setup();
        let pts = sample_points::<G1Affine>(2);
        let points = to_points(&[pts[0], -pts[0], pts[1], pts[1]]);
        let scalars: Vec<BigUint> = [2u32, 2, 3, 3].into_iter().map(BigUint::from).collect();
        let cd = build(&points, &scalars, CurveId::Bn254).unwrap();
        assert_eq!(cd.result, G1Point::from_affine(&(pts[1] * Fr::from(6u64)).to_affine()));
        assert_eq!(verify(&cd), Ok(()));

        let same = to_points(&[pts[0]; 3]);
        let cd = build(&same, &scalars[..3], CurveId::Bn254).unwrap();
        assert_eq!(cd.result, G1Point::from_affine(&(pts[0] * Fr::from(7u64)).to_affine()));
        assert_eq!(verify(&cd), Ok(()));

        // Σ s_i·P_i is the identity although every point and scalar is nonzero.
        let cd = build(&to_points(&[pts[0], -pts[0]]), &scalars[..2], CurveId::Bn254).unwrap();
        assert!(cd.result.is_infinity());
        assert_eq!(verify(&cd), Ok(()));
    }

    #[test]
    fn test_scalars_at_the_half_boundary() {
        setup();
        let g = G1Affine::generator();
        let r = modulus::<Fr>();
        let low_max = (BigUint::one() << 128usize) - 1u32;
        let max = (BigUint::one() << 256usize) - BigUint::one();
        for s in [low_max.clone(), BigUint::one() << 128usize, max] {
            let cd = build(&[G1Point::from_affine(&g)], &[s.clone()], CurveId::Bn254).unwrap();
            let expected = g * reduce_to_field::<Fr>(&s, &r);
            assert_eq!(cd.result, G1Point::from_affine(&expected.to_affine()), "{s}");
            assert_eq!(verify(&cd), Ok(()), "{s}");
        }

        // An empty high half makes q_high the identity.
        let cd = build(&[G1Point::from_affine(&g)], &[low_max], CurveId::Bn254).unwrap();
        assert!(cd.hint.q_high.is_infinity());
        assert!(cd.hint.q_high_shifted.is_infinity());
        assert_eq!(verify(&cd), Ok(()));

        // An empty low half makes q_low the identity.
        let cd = build(&[G1Point::from_affine(&g)], &[BigUint::one() << 128usize], CurveId::Bn254).unwrap();
        assert!(cd.hint.q_low.is_infinity());
        assert_eq!(cd.hint.q_high, G1Point::from_affine(&g));
    }

    #[test]
    fn test_single_random_term() {
        setup();
        for _ in 0..3 {
            let (points, scalars, cd) = random_calldata::<G1Affine>(1);
            assert_eq!(cd.result, G1Point::from_affine(&(points[0] * scalars[0]).to_affine()));
            assert_eq!(verify(&cd), Ok(()));
        }
    }

    #[test]
    fn test_scalar_reduction() {
        setup();
        let g = G1Affine::generator();
        let minus_one = field_to_biguint(&-Fr::ONE);
        let cd = build(&[G1Point::from_affine(&g)], &[minus_one], CurveId::Bn254).unwrap();
        assert_eq!(cd.result, G1Point::from_affine(&(-g)));
    }

    #[test]
    fn test_invalid_encodings() {
        setup();
        let off_curve = G1Point::new(1u32.into(), 3u32.into());
        assert!(matches!(
            build(&[off_curve], &[BigUint::one()], CurveId::Bn254),
            Err(MsmError::InvalidEncoding(_))
        ));

        // A BLS12-381 point outside the prime order subgroup: x = 0 gives y^2 = 4.
        let torsion = G1Point::new(0u32.into(), 2u32.into());
        assert!(matches!(
            build(&[torsion], &[BigUint::one()], CurveId::Bls12_381),
            Err(MsmError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_unsupported_curves() {
        setup();
        for id in [4usize, 6, 100] {
            assert_eq!(
                msm_calldata_builder(&[], &[], id, &CalldataOptions::default()),
                Err(MsmError::UnsupportedCurve(id))
            );
        }
    }

    #[test]
    fn test_concurrent_builds() {
        setup();
        let points = to_points(&sample_points::<G1Affine>(3));
        let scalars = to_ints(&sample_scalars::<Fr>(3));
        let expected = build(&points, &scalars, CurveId::Bn254).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| build(&points, &scalars, CurveId::Bn254).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
