/// One customer order. A field counts as set when it is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Order {
    pub(crate) drink: String,
    pub(crate) size: String,
    pub(crate) milk: String,
    pub(crate) customer_name: String,
}

impl Order {
    pub(crate) fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Unset fields in fill order: drink, size, milk, name.
    pub(crate) fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("drink", &self.drink),
            ("size", &self.size),
            ("milk", &self.milk),
            ("name", &self.customer_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderValidation {
    pub(crate) complete: bool,
    pub(crate) missing_fields: Vec<String>,
}

pub(crate) fn validate_order(order: &Order) -> OrderValidation {
    let missing_fields: Vec<String> = order
        .missing_fields()
        .into_iter()
        .map(str::to_string)
        .collect();
    OrderValidation {
        complete: order.is_complete(),
        missing_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_order() -> Order {
        Order {
            drink: "Latte".to_string(),
            size: "Medium".to_string(),
            milk: "Oat Milk".to_string(),
            customer_name: "Sam".to_string(),
        }
    }

    #[test]
    fn full_order_is_complete() {
        let order = full_order();
        assert!(order.is_complete());
        assert!(order.missing_fields().is_empty());
        assert_eq!(
            validate_order(&order),
            OrderValidation {
                complete: true,
                missing_fields: Vec::new(),
            }
        );
    }

    #[test]
    fn empty_order_misses_every_field_in_order() {
        let order = Order::default();
        assert!(!order.is_complete());
        assert_eq!(order.missing_fields(), vec!["drink", "size", "milk", "name"]);
    }

    #[test]
    fn validation_reports_only_unset_fields() {
        let order = Order {
            milk: String::new(),
            customer_name: String::new(),
            ..full_order()
        };
        let validation = validate_order(&order);
        assert!(!validation.complete);
        assert_eq!(validation.missing_fields, vec!["milk", "name"]);
    }

    #[test]
    fn clear_resets_every_field() {
        let mut order = full_order();
        order.clear();
        assert_eq!(order, Order::default());
    }
}
