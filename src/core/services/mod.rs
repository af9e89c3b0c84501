pub mod finance_service;
pub mod habit_service;

pub use finance_service::{
    percent_share, rounded_percent, CategoryTotal, FinanceService, MonthFilter, MonthSummary,
    YearTotals, UNKNOWN_CATEGORY,
};
pub use habit_service::{
    AnalyticsOverview, CategoryStats, HabitAnalytics, HabitRow, HabitService, HabitTally,
    MonthTrend, StreakResult,
};
