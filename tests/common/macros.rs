/// Asserts that every food unit ever placed is still accounted for.
#[macro_export]
macro_rules! assert_food_conserved {
    ($world:expr, $initial:expr, $lost:expr) => {
        let remaining = $world.remaining_food();
        let carried = $world.carried_food();
        let delivered = $world.delivered_food();
        assert_eq!(
            remaining + carried + delivered + $lost,
            $initial,
            "food leak at tick {}: remaining {} carried {} delivered {} lost {}",
            $world.tick(),
            remaining,
            carried,
            delivered,
            $lost
        );
    };
}

/// Asserts that every pheromone value lies within [0, max].
#[macro_export]
macro_rules! assert_pheromone_bounded {
    ($field:expr) => {
        let max = $field.params().max_intensity;
        for (i, cell) in $field.cells().iter().enumerate() {
            assert!(
                (0.0..=max).contains(&cell.food) && (0.0..=max).contains(&cell.home),
                "cell {} out of bounds: {:?}",
                i,
                cell
            );
        }
    };
}
