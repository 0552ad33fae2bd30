use super::EntityMetadata;

/// Трейт для корня агрегата
///
/// Определяет обязательные методы и метаданные для всех агрегатов системы
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id;

    // ============================================================================
    // Методы экземпляра (данные конкретной записи)
    // ============================================================================

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    /// Получить бизнес-код записи (например, "TXN-20250101-A1B2C3")
    fn code(&self) -> &str;

    /// Получить описание/название записи
    fn description(&self) -> &str;

    /// Получить метаданные жизненного цикла
    fn metadata(&self) -> &EntityMetadata;

    // ============================================================================
    // Метаданные класса агрегата (статические данные)
    // ============================================================================

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции для БД (например, "store")
    fn collection_name() -> &'static str;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Полное имя агрегата для системы (например, "a001_store")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_store::Store;
    use crate::domain::a002_product::Product;

    fn describe<A: AggregateRoot>(aggregate: &A) -> String {
        format!(
            "{} [{}] {} v{}",
            A::full_name(),
            aggregate.code(),
            aggregate.description(),
            aggregate.metadata().version
        )
    }

    #[test]
    fn test_full_name_and_instance_accessors() {
        let store = Store::new_for_insert(
            "STORE-001".into(),
            "Центральный".into(),
            None,
            None,
            None,
        );
        assert_eq!(Store::full_name(), "a001_store");
        assert_eq!(describe(&store), "a001_store [STORE-001] Центральный v0");

        let product = Product::new_for_insert(
            store.to_string_id(),
            "100001".into(),
            "Молоко 3,2%".into(),
            4.99,
            2.10,
            None,
            None,
            10,
            None,
        );
        assert_eq!(Product::full_name(), "a002_product");
        assert!(describe(&product).starts_with("a002_product [100001]"));
    }
}
