use std::any::Any;

/// Extracts the message from a panic payload, if it carries one.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		Some((*s).to_string())
	} else {
		payload.downcast_ref::<String>().cloned()
	}
}

#[cfg(test)]
mod tests {
	use std::any::Any;

	use super::panic_message;

	fn join_panic(f: impl FnOnce() + Send + 'static) -> Box<dyn Any + Send> {
		std::thread::spawn(f).join().unwrap_err()
	}

	#[test]
	fn extracts_static_str_payload() {
		let err = join_panic(|| panic!("boom-str"));
		let msg = panic_message(err.as_ref()).expect("should carry a message");
		assert!(msg.contains("boom-str"), "expected 'boom-str', got: {msg}");
	}

	#[test]
	fn extracts_string_payload() {
		let err = join_panic(|| panic!("{}", String::from("boom-string")));
		let msg = panic_message(err.as_ref()).expect("should carry a message");
		assert!(msg.contains("boom-string"), "expected 'boom-string', got: {msg}");
	}

	#[test]
	fn returns_none_for_opaque_payload() {
		let err = join_panic(|| std::panic::panic_any(17_u32));
		assert!(panic_message(err.as_ref()).is_none());
	}
}
