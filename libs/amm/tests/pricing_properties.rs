//! Pricing Property-Based Tests
//!
//! Properties of the tick, range, liquidity and bonding-curve math that must hold
//! regardless of specific input values.

use num_bigint::BigUint;
use proptest::prelude::*;
use rust_decimal::Decimal;
use satswap_amm::{
    tick_range_from_prices, BondingCurve, ConstantProductState, LiquidityMath, PoolPrice,
    PriceScale, PricingError, TickMath, TickRounding, MAX_TICK, MIN_TICK,
};

fn spacing() -> impl Strategy<Value = i32> {
    prop_oneof![Just(1), Just(10), Just(60), Just(200)]
}

prop_compose! {
    fn usable_tick()(spacing in spacing(), raw in MIN_TICK..=MAX_TICK) -> (i32, i32) {
        let (min_usable, max_usable) = TickMath::usable_bounds(spacing);
        let tick = TickMath::round_to_spacing(raw.clamp(min_usable, max_usable), spacing, TickRounding::Floor)
            .unwrap();
        (tick, spacing)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_tick_round_trip((tick, spacing) in usable_tick()) {
        let price = TickMath::tick_to_price(tick).unwrap();
        prop_assert_eq!(TickMath::price_to_tick(&price, spacing, TickRounding::Floor).unwrap(), tick);
        prop_assert_eq!(TickMath::price_to_tick(&price, spacing, TickRounding::Ceil).unwrap(), tick);
    }

    #[test]
    fn prop_tick_price_is_strictly_increasing(t1 in MIN_TICK..MAX_TICK, delta in 1i32..5_000) {
        let t2 = (t1 + delta).min(MAX_TICK);
        let p1 = TickMath::sqrt_ratio_at_tick(t1).unwrap();
        let p2 = TickMath::sqrt_ratio_at_tick(t2).unwrap();
        prop_assert!(p1 < p2);
    }

    #[test]
    fn prop_tick_range_is_valid_or_fails(
        lower_mantissa in 1i64..1_000_000_000,
        width in 1i64..1_000_000_000,
        price_scale in 0u32..=12,
        decimals_base in 0u32..=18,
        decimals_quote in 0u32..=18,
        base_is_asset_a in any::<bool>(),
        spacing in spacing(),
    ) {
        let lower = Decimal::new(lower_mantissa, price_scale);
        let upper = Decimal::new(lower_mantissa + width, price_scale);
        let scale = PriceScale::new(decimals_base, decimals_quote, base_is_asset_a).unwrap();
        match tick_range_from_prices(lower, upper, &scale, spacing) {
            Ok(range) => {
                prop_assert!(range.tick_lower < range.tick_upper);
                prop_assert_eq!(range.tick_lower.rem_euclid(spacing), 0);
                prop_assert_eq!(range.tick_upper.rem_euclid(spacing), 0);
            }
            Err(PricingError::RoundingCollapse { .. }) | Err(PricingError::PriceOutOfRange) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn prop_deposit_never_overdraws(
        current in -50_000i32..50_000,
        lower in -60_000i32..60_000,
        width in 1i32..20_000,
        amount_a in 0u128..1_000_000_000_000_000_000,
        amount_b in 0u128..1_000_000_000_000_000_000,
    ) {
        let upper = (lower + width).min(MAX_TICK);
        let price = PoolPrice::at_tick(current).unwrap();
        match LiquidityMath::liquidity_from_amounts(&price, lower, upper, amount_a, amount_b) {
            Ok(quote) => {
                prop_assert!(quote.liquidity > 0);
                prop_assert!(quote.amount_a_used <= amount_a);
                prop_assert!(quote.amount_b_used <= amount_b);
                prop_assert_eq!(quote.amount_a_used + quote.refund_a, amount_a);
                prop_assert_eq!(quote.amount_b_used + quote.refund_b, amount_b);
            }
            Err(err) => prop_assert_eq!(err, PricingError::ZeroLiquidity),
        }
    }

    #[test]
    fn prop_bonding_curve_invariant(
        supply in 1_000u128..1_000_000_000_000_000,
        pct in 51u32..=99,
        raise in 1u128..1_000_000_000_000,
    ) {
        if let Ok(r) = BondingCurve::calculate_virtual_reserves(supply, pct, raise) {
            let after = BigUint::from(r.virtual_reserve_a - r.threshold)
                * BigUint::from(r.virtual_reserve_b + raise);
            prop_assert_eq!(after, r.k());
            prop_assert_eq!(r.threshold, supply * pct as u128 / 100);
            prop_assert_eq!(r.sale_for_payment(raise).unwrap(), r.threshold);
            prop_assert_eq!(r.payment_for_sale(r.threshold).unwrap(), raise);
        }
    }

    #[test]
    fn prop_required_input_delivers_output(
        reserve_in in 1_000u128..1_000_000_000_000,
        reserve_out in 1_000u128..1_000_000_000_000,
        fee_bps in 0u32..1_000,
        fraction in 1u128..999,
    ) {
        let state = ConstantProductState::new(reserve_in, reserve_out, fee_bps).unwrap();
        let wanted = (reserve_out * fraction / 1_000).max(1);
        let needed = state.amount_in_for(wanted).unwrap();
        prop_assert!(state.amount_out(needed).unwrap() >= wanted);
    }
}
