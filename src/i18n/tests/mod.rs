//! End-to-end conversion tests over generated workbooks.
