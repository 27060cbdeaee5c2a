/// Router Module Index
///
/// Routes are split by who may reach them. Access control for the dashboard is applied by the
/// routing pipeline before route matching, and again by the `AuthUser` extractor in each handler.

/// Routes accessible to anyone: health, session lifecycle, board creation and public boards.
pub mod public;

/// Owner dashboard routes (apex host, signed-in owners only).
pub mod dashboard;
