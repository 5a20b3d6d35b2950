/// Execution classes used for worker thread naming and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Background work that may be delayed without user-visible effect.
	Background,
	/// Blocking I/O work executed on a dedicated thread.
	IoBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
		}
	}
}
