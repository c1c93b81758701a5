/// Трейт для корня агрегата
///
/// Все сущности живут на удалённой платформе, локально хранится только
/// зеркало последнего ответа. Идентификатор выдаёт платформа.
pub trait AggregateRoot {
    // ============================================================================
    // Методы экземпляра (данные конкретной записи)
    // ============================================================================

    /// Получить ID записи на платформе
    fn id(&self) -> &str;

    /// Получить название записи для UI (если не задано, то ID)
    fn display_name(&self) -> &str;

    // ============================================================================
    // Метаданные класса агрегата (статические данные)
    // ============================================================================

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции (например, "agent")
    fn collection_name() -> &'static str;

    /// Имя элемента для UI (единственное число, например, "Agent")
    fn element_name() -> &'static str;

    /// Имя списка для UI (множественное число, например, "Agents")
    fn list_name() -> &'static str;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Полное имя агрегата для системы (например, "a001_agent")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
